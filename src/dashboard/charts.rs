//! Chart generation and rendering for the dashboard.
//!
//! Charts are built as ECharts configuration with `charming` and initialised
//! by a script added to the page head.

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::Bar,
};
use maud::PreEscaped;
use time::Date;

use crate::{dashboard::aggregation::format_day_labels, html::HeadElement};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Each chart follows the browser's dark mode setting and resizes with the
/// window.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// A bar per day of revenue.
pub(super) fn daily_revenue_chart(daily_revenue: &[(Date, f64)]) -> Chart {
    let days: Vec<Date> = daily_revenue.iter().map(|(day, _)| *day).collect();
    let labels = format_day_labels(&days);
    let values: Vec<f64> = daily_revenue.iter().map(|(_, revenue)| *revenue).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Daily Revenue")
                .subtext("Last thirty days"),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Revenue").data(values))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{DashboardChart, charts_script, daily_revenue_chart};
    use crate::html::HeadElement;

    #[test]
    fn chart_contains_labels_and_values() {
        let chart = daily_revenue_chart(&[
            (date!(2025 - 03 - 13), 120.0),
            (date!(2025 - 03 - 14), 0.0),
        ]);

        let options = chart.to_string();

        assert!(options.contains("13 Mar"));
        assert!(options.contains("14 Mar"));
        assert!(options.contains("120"));
    }

    #[test]
    fn script_initialises_every_chart() {
        let charts = [DashboardChart {
            id: "daily-revenue-chart",
            options: "{}".to_owned(),
        }];

        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("expected inline script");
        };

        assert!(script.0.contains("document.getElementById(\"daily-revenue-chart\")"));
    }
}
