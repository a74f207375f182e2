use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use reach_study::joints::PoseMap;
use reach_study::StudyResults;

fn right_align(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_results_table(name: &str, records: usize, results: &StudyResults) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new(format!("Study: {}", name)).add_attribute(Attribute::Bold),
        Cell::new("Value"),
    ]);

    table.add_row(vec![Cell::new("Records"), Cell::new(records)]);
    table.add_row(vec![
        Cell::new("Percent Reached"),
        Cell::new(format!("{:.2}%", results.reach_percentage)),
    ]);
    table.add_row(vec![
        Cell::new("Total Pose Score"),
        Cell::new(format!("{:.4}", results.total_pose_score)),
    ]);
    table.add_row(vec![
        Cell::new("Normalized Total Pose Score"),
        Cell::new(format!("{:.4}", results.norm_total_pose_score)),
    ]);
    table.add_row(vec![
        Cell::new("Average Reachable Neighbors"),
        Cell::new(format!("{:.4}", results.avg_num_neighbors)),
    ]);
    table.add_row(vec![
        Cell::new("Average Joint Distance"),
        Cell::new(format!("{:.4}", results.avg_joint_distance)),
    ]);
    right_align(&mut table, 1..=1);

    println!("\n{}", table);
}

/// One row per study, highlighting the best normalized score.
pub fn print_comparison_report(results: &[(String, StudyResults)]) {
    let Some(best) = results.iter().max_by(|a, b| {
        a.1.norm_total_pose_score
            .total_cmp(&b.1.norm_total_pose_score)
    }) else {
        return;
    };
    let best_score = best.1.norm_total_pose_score;

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new(format!("Comparison vs Best ({})", best.0)).add_attribute(Attribute::Bold),
        Cell::new("Reached"),
        Cell::new("Total Score"),
        Cell::new("Norm. Score"),
        Cell::new("% Diff"),
    ]);

    for (name, r) in results {
        let delta = r.norm_total_pose_score - best_score;
        let pct = if best_score > 0.0 {
            (delta / best_score) * 100.0
        } else {
            0.0
        };

        let name_cell = if name == &best.0 {
            Cell::new(name)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(name).add_attribute(Attribute::Bold)
        };

        table.add_row(vec![
            name_cell,
            Cell::new(format!("{:.2}%", r.reach_percentage)),
            Cell::new(format!("{:.4}", r.total_pose_score)),
            Cell::new(format!("{:.4}", r.norm_total_pose_score)),
            Cell::new(format!("{:.1}%", pct)),
        ]);
    }
    right_align(&mut table, 1..=4);

    println!("\n{}", table);
}

pub fn print_score_report(scorer: &str, group: &str, state: &PoseMap, score: f64) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new(format!("{} ({})", scorer, group)).add_attribute(Attribute::Bold),
        Cell::new("Position"),
    ]);
    for (joint, position) in state {
        table.add_row(vec![Cell::new(joint), Cell::new(format!("{:.4}", position))]);
    }
    table.add_row(vec![
        Cell::new("Score").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.6}", score)).fg(Color::Cyan),
    ]);
    right_align(&mut table, 1..=1);

    println!("\n{}", table);
}
