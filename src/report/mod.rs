//! Markdown report rendering from embedded templates

use chrono::Utc;
use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::core::acceptance::Verdict;
use crate::core::analysis::AnalysisReport;
use crate::entities::stackup::{Stackup, ToleranceType};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Template used by [`ReportGenerator::render`]
pub const REPORT_TEMPLATE: &str = "report.md.tera";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

/// Row of the contributor table
#[derive(Debug, Clone, Serialize)]
struct RowView {
    item: usize,
    description: String,
    nominal: String,
    direction: String,
    tol: String,
    tol_type: String,
    cpk: String,
}

/// Row of the Pareto table
#[derive(Debug, Clone, Serialize)]
struct ParetoView {
    rank: usize,
    item: usize,
    description: String,
    percent: String,
    cumulative: String,
    class: String,
}

/// Everything the template can reference, already formatted
#[derive(Debug, Clone, Serialize)]
struct ReportView {
    title: String,
    project: String,
    part_nr: String,
    analyst: String,
    creation_date: String,
    generated: String,
    critical_feature: String,
    functional_description: String,
    nominal_target: String,
    lsl: String,
    usl: String,
    mode: String,
    advanced: bool,
    show_tolerance_type: bool,
    criterion: String,
    criterion_description: String,
    verdict: String,
    contributors: usize,
    stack_mean: String,
    worst_case: String,
    worst_case_min: String,
    worst_case_max: String,
    rss: String,
    rss_min: String,
    rss_max: String,
    sigma: String,
    range_3s_min: String,
    range_3s_max: String,
    range_6s_min: String,
    range_6s_max: String,
    cp: String,
    cpk: String,
    z_upper: String,
    z_lower: String,
    sigma_level: String,
    percent_out_of_spec: String,
    dpmo: String,
    rows: Vec<RowView>,
    pareto: Vec<ParetoView>,
}

/// Report generator using Tera
pub struct ReportGenerator {
    tera: Tera,
    precision: usize,
}

impl ReportGenerator {
    /// Create a generator with the embedded templates
    pub fn new(precision: usize) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera, precision })
    }

    /// Render the Markdown report for a stack and its analysis
    pub fn render(&self, stackup: &Stackup, report: &AnalysisReport) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == REPORT_TEMPLATE) {
            return Err(TemplateError::NotFound(REPORT_TEMPLATE.to_string()));
        }

        let view = self.view(stackup, report);
        let context = tera::Context::from_serialize(&view)
            .map_err(|e| TemplateError::RenderError(e.to_string()))?;

        self.tera
            .render(REPORT_TEMPLATE, &context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    fn num(&self, value: f64) -> String {
        format!("{:.*}", self.precision, value)
    }

    fn opt(&self, value: Option<f64>) -> String {
        value.map(|v| self.num(v)).unwrap_or_else(|| "N/A".to_string())
    }

    fn view(&self, stackup: &Stackup, report: &AnalysisReport) -> ReportView {
        let setup = &stackup.analysis_setup;
        let stack = &report.stack;
        let cap = &report.capability;
        let (wc_min, wc_max) = stack.worst_case_range();
        let (rss_min, rss_max) = stack.rss_range();
        let (s3_min, s3_max) = stack.sigma_range(3.0);
        let (s6_min, s6_max) = stack.sigma_range(6.0);

        let rows = stackup
            .stack_data
            .iter()
            .enumerate()
            .map(|(i, c)| RowView {
                item: i + 1,
                description: table_cell(c.display_name()),
                nominal: self.num(c.nominal),
                direction: c.direction.to_string(),
                tol: table_cell(&c.tol.to_string()),
                tol_type: match &c.tol_type {
                    ToleranceType::Linear => String::new(),
                    other => table_cell(&other.to_string()),
                },
                cpk: c.cpk.map(|v| format!("{:.2}", v)).unwrap_or_default(),
            })
            .collect();

        let pareto = report
            .pareto
            .entries()
            .iter()
            .enumerate()
            .map(|(rank, e)| ParetoView {
                rank: rank + 1,
                item: e.original_index + 1,
                description: table_cell(&e.description),
                percent: format!("{:.1}", e.percent),
                cumulative: format!("{:.1}", e.cumulative_percent),
                class: e.class.to_string(),
            })
            .collect();

        ReportView {
            title: stackup.title().to_string(),
            project: table_cell(&setup.metadata.project),
            part_nr: table_cell(&setup.metadata.part_nr),
            analyst: table_cell(&setup.metadata.analyst),
            creation_date: table_cell(&setup.metadata.creation_date),
            generated: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
            critical_feature: setup.critical_requirement.critical_feature.clone(),
            functional_description: setup.assumptions_context.functional_description.clone(),
            nominal_target: self.opt(report.limits.nominal_target),
            lsl: self.opt(report.limits.lsl),
            usl: self.opt(report.limits.usl),
            mode: report.mode.to_string(),
            advanced: stackup.settings.advanced_statistical_mode,
            show_tolerance_type: stackup.settings.show_tolerance_type,
            criterion: report.judgement.criterion.key().to_string(),
            criterion_description: report.judgement.criterion.describe(),
            verdict: match report.judgement.verdict {
                Verdict::Pass => "PASS".to_string(),
                Verdict::Fail => "FAIL".to_string(),
                Verdict::Indeterminate => match report.judgement.reason {
                    Some(reason) => format!("N/A ({})", reason),
                    None => "N/A".to_string(),
                },
            },
            contributors: stack.count,
            stack_mean: self.num(stack.stack_mean),
            worst_case: self.num(stack.worst_case),
            worst_case_min: self.num(wc_min),
            worst_case_max: self.num(wc_max),
            rss: self.num(stack.rss),
            rss_min: self.num(rss_min),
            rss_max: self.num(rss_max),
            sigma: self.num(stack.stack_sigma),
            range_3s_min: self.num(s3_min),
            range_3s_max: self.num(s3_max),
            range_6s_min: self.num(s6_min),
            range_6s_max: self.num(s6_max),
            cp: cap.cp.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".to_string()),
            cpk: cap.cpk.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".to_string()),
            z_upper: cap.z_upper.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".to_string()),
            z_lower: cap.z_lower.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".to_string()),
            sigma_level: cap
                .sigma_level
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "N/A".to_string()),
            percent_out_of_spec: cap
                .percent_out_of_spec
                .map(|v| format!("{:.4}%", v))
                .unwrap_or_else(|| "N/A".to_string()),
            dpmo: cap.dpmo.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "N/A".to_string()),
            rows,
            pareto,
        }
    }
}

/// Text safe inside a Markdown table cell
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
