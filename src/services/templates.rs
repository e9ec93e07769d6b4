use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub template_url: &'static str,
    pub category: &'static str,
}

pub static TEMPLATES: [ReportTemplate; 4] = [
    ReportTemplate {
        id: "sales-dashboard",
        name: "Sales Performance Dashboard",
        description: "Track sales metrics, revenue trends, and performance KPIs",
        template_url: "template-sales-dashboard-001",
        category: "Sales",
    },
    ReportTemplate {
        id: "hr-analytics",
        name: "HR Analytics Dashboard",
        description: "Employee metrics, recruitment data, and workforce analytics",
        template_url: "template-hr-analytics-002",
        category: "Human Resources",
    },
    ReportTemplate {
        id: "financial-report",
        name: "Financial Reporting",
        description: "Financial statements, budget analysis, and cost tracking",
        template_url: "template-financial-003",
        category: "Finance",
    },
    ReportTemplate {
        id: "customer-insights",
        name: "Customer Insights",
        description: "Customer behavior, satisfaction scores, and engagement metrics",
        template_url: "template-customer-004",
        category: "Marketing",
    },
];

pub fn find_template(id: &str) -> Result<&'static ReportTemplate, AppError> {
    TEMPLATES
        .iter()
        .find(|template| template.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Unknown template: {}", id)))
}
