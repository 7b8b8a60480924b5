//! The expense breakdown pie chart on the summary page.
//!
//! Charts are built with charming and handed to ECharts in the browser as
//! JSON options.

use std::collections::BTreeMap;

use charming::{
    Chart,
    component::{Legend, Title},
    element::{JsFunction, Label, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::html::HeadElement;

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct SummaryChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// The container the chart is drawn into.
pub(super) fn chart_view(chart: &SummaryChart) -> Markup {
    html!(
        div
            id=(chart.id)
            class="w-full min-h-[380px] rounded dark:bg-gray-100"
        {}
    )
}

/// Initialises each chart once the page has loaded, following the system colour scheme.
pub(super) fn charts_script(charts: &[SummaryChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chart = echarts.init(document.getElementById("{}"));
                    chart.setOption({});

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    HeadElement::ScriptSource(PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    )))
}

/// A pie chart of the expense total per category, labelled with each slice's percentage.
pub(super) fn expenses_pie_chart(expenses_by_category: &BTreeMap<String, f64>) -> Chart {
    let data: Vec<(f64, &str)> = expenses_by_category
        .iter()
        .map(|(category, total)| (*total, category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Expenses by category").left("center"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius("60%")
                .label(Label::new().show(true).formatter("{b}: {d}%"))
                .data(data),
        )
}

fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return currencyFormatter.format(number);",
    )
}
