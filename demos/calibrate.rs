//! Calibrate a small authored matrix against a handful of labeled lineages.
//!
//! Run with: `cargo run --example calibrate`

use tier_calibration::{
    report, seeded_rng, CompatibilityMatrix, Lineage, LocalSearchOptimizer, Observation,
    Progress, SearchControl, SearchParams, Tier,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<Vec<f64>> = (0..6)
        .map(|r| (0..6).map(|c| ((r * 7 + c * 3) % 11) as f64 * 2.0).collect())
        .collect();
    let matrix = CompatibilityMatrix::from_rows(&rows)?;

    let observations = vec![
        Observation::labeled(Lineage::new(0, 1, 2, 3, 4, 5, 0), Tier::Star),
        Observation::labeled(Lineage::new(1, 2, 3, 4, 5, 0, 1), Tier::Circle).with_bonuses(1, 2),
        Observation::labeled(Lineage::new(2, 3, 4, 5, 0, 1, 2), Tier::Triangle),
        Observation::labeled(Lineage::new(3, 4, 5, 0, 1, 2, 3), Tier::DoubleCircle).with_noble(25.0),
        Observation::labeled(Lineage::new(4, 5, 0, 1, 2, 3, 4), Tier::FilledTriangle),
    ];

    let mut optimizer = LocalSearchOptimizer::new(&matrix);
    let mut on_progress = |p: &Progress| {
        println!(
            "[{:>5}/{}] current {:>12.1} ({} off)   best {:>12.1}",
            p.iteration, p.total, p.current.penalty, p.current.contradictions, p.best.penalty
        );
        SearchControl::Continue
    };
    let params = SearchParams::new(2_000, 3.0).with_priority(vec![0, 1]);
    let outcome = optimizer.optimize(&observations, &params, &mut seeded_rng(42), &mut on_progress)?;

    println!(
        "\npenalty {:.1} -> {:.1}, contradictions {} -> {}",
        outcome.initial.penalty,
        outcome.evaluation.penalty,
        outcome.initial.contradictions,
        outcome.evaluation.contradictions
    );
    println!(
        "{} cells changed, max drift {:.2}",
        outcome.matrix.changed_cells(&matrix).len(),
        outcome.matrix.max_deviation(&matrix)
    );

    for row in report(&outcome.matrix, &observations) {
        let expected = row.expected.map_or_else(|| "?".to_string(), |t| t.to_string());
        println!(
            "#{} score {:>7.1}  got {}  want {}  penalty {:.1}",
            row.index, row.score, row.classified, expected, row.penalty
        );
    }
    Ok(())
}
