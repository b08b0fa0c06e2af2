use plotly::common::{DashType, Fill, Line, Mode};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};

use crate::learning_curve::LearningCurve;
use crate::metrics::RocCurve;

const PALETTE: [(u8, u8, u8); 8] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
];

fn color(index: usize, alpha: f64) -> String {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

/// One ROC line per classifier, labelled with its AUC, plus the chance
/// diagonal.
pub fn plot_roc_curves(curves: &[(String, RocCurve)], title: &str) -> Plot {
    let mut plot = Plot::new();

    for (i, (name, roc)) in curves.iter().enumerate() {
        let label = format!("ROC {} (AUC = {:.2})", name, roc.auc());
        plot.add_trace(
            Scatter::new(roc.fpr.clone(), roc.tpr.clone())
                .mode(Mode::Lines)
                .name(label.as_str())
                .line(Line::new().color(color(i, 1.0))),
        );
    }

    let chance = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .line(Line::new().color("grey").dash(DashType::Dash));
    plot.add_trace(chance);

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("False Positive Rate"))
            .y_axis(Axis::new().title("True Positive Rate")),
    );
    plot
}

/// Train and cross-validation accuracy against training size, with a ±σ
/// band around the cross-validation mean.
pub fn plot_learning_curves(curves: &[LearningCurve], title: &str) -> Plot {
    let mut plot = Plot::new();

    for (i, curve) in curves.iter().enumerate() {
        let sizes: Vec<f64> = curve.train_sizes.iter().map(|&s| s as f64).collect();
        let train_mean = curve.train_mean();
        let test_mean = curve.test_mean();
        let test_std = curve.test_std();

        plot.add_trace(
            Scatter::new(sizes.clone(), train_mean)
                .name(format!("{} (train)", curve.name).as_str())
                .mode(Mode::LinesMarkers)
                .line(Line::new().color(color(i, 1.0)).dash(DashType::Dot)),
        );
        plot.add_trace(
            Scatter::new(sizes.clone(), test_mean.clone())
                .name(curve.name.as_str())
                .mode(Mode::LinesMarkers)
                .line(Line::new().color(color(i, 1.0))),
        );

        // closed polygon: upper edge left to right, lower edge back
        let mut band_x = sizes.clone();
        band_x.extend(sizes.iter().rev());
        let mut band_y: Vec<f64> = test_mean.iter().zip(&test_std).map(|(m, s)| m + s).collect();
        band_y.extend(test_mean.iter().zip(&test_std).rev().map(|(m, s)| m - s));

        plot.add_trace(
            Scatter::new(band_x, band_y)
                .name(format!("{} ± σ", curve.name).as_str())
                .mode(Mode::Lines)
                .fill(Fill::ToSelf)
                .line(Line::new().width(0.0))
                .fill_color(color(i, 0.15))
                .show_legend(false),
        );
    }

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Training samples"))
            .y_axis(Axis::new().title("Accuracy")),
    );
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::Label;
    use crate::metrics::roc_curve;

    #[test]
    fn roc_plot_has_chance_line() {
        let truth: Vec<Label> = ["pos", "neg"].iter().map(|&l| Label::from(l)).collect();
        let roc = roc_curve(&truth, &[1.0, 0.0], &Label::from("pos")).unwrap();
        let plot = plot_roc_curves(&[("svm".to_string(), roc)], "ROC");
        let json = plot.to_json();
        assert!(json.contains("ROC svm (AUC = 1.00)"));
        assert!(json.contains("Chance"));
    }

    #[test]
    fn learning_plot_has_three_traces_per_curve() {
        let curve = LearningCurve {
            name: "nb".to_string(),
            train_sizes: vec![2, 4],
            train_scores: vec![vec![1.0, 1.0], vec![0.9, 1.0]],
            test_scores: vec![vec![0.5, 0.7], vec![0.8, 0.8]],
        };
        let plot = plot_learning_curves(&[curve.clone(), curve], "Learning curve");
        assert_eq!(plot.to_json().matches("\"type\":\"scatter\"").count(), 6);
    }
}
