//! Static portfolio content shown around the chat widget.
//!
//! The built-in [`Portfolio::default`] is the stock site; a JSON file with the
//! same shape can replace any part of it.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub owner: String,
    pub tagline: String,
    pub intro: String,
    pub assistant_title: String,
    pub assistant_subtitle: String,
    pub greeting: String,
    pub suggested_prompts: Vec<String>,
    pub stats: Vec<StatCard>,
    pub recent_work: Vec<Project>,
    pub overview: Vec<Metric>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub trend: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Completed,
    Active,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Active => "Active",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub category: String,
    pub date: String,
    pub status: ProjectStatus,
}

/// A named percentage, drawn as a progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub percent: u8,
}

impl Metric {
    /// Percent clamped to 0..=100.
    pub fn ratio(&self) -> f64 {
        f64::from(self.percent.min(100)) / 100.0
    }
}

fn stat(label: &str, value: &str, trend: &str) -> StatCard {
    StatCard {
        label: label.to_string(),
        value: value.to_string(),
        trend: Some(trend.to_string()),
    }
}

fn project(title: &str, category: &str, date: &str, status: ProjectStatus) -> Project {
    Project {
        title: title.to_string(),
        category: category.to_string(),
        date: date.to_string(),
        status,
    }
}

fn metric(label: &str, percent: u8) -> Metric {
    Metric {
        label: label.to_string(),
        percent,
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            owner: "Shreyas Kapale".to_string(),
            tagline: "Full-stack Developer & AI Enthusiast".to_string(),
            intro: "Ask the assistant about my background, skills, and projects using the chat widget in the bottom-right corner.".to_string(),
            assistant_title: "Ask me about Shreyas".to_string(),
            assistant_subtitle: "Portfolio Assistant".to_string(),
            greeting: "Hi! I'm here to answer questions about Shreyas's background and work. What would you like to know?".to_string(),
            suggested_prompts: vec![
                "What are Shreyas's technical skills?".to_string(),
                "Tell me about his recent projects".to_string(),
                "What's his work experience?".to_string(),
                "What are his areas of expertise?".to_string(),
            ],
            stats: vec![
                stat("Projects Completed", "24", "+3 this month"),
                stat("Skills", "18", "+2 new skills"),
                stat("Clients Served", "15", "+1 new client"),
                stat("Active Projects", "5", "On track"),
            ],
            recent_work: vec![
                project("AI Chatbot System", "Full-stack Development", "Nov 2024", ProjectStatus::Completed),
                project("Portfolio Website", "Web Development", "Oct 2024", ProjectStatus::Completed),
                project("Data Analytics Dashboard", "React + TypeScript", "Sep 2024", ProjectStatus::Completed),
                project("Machine Learning Integration", "AI/ML", "In Progress", ProjectStatus::Active),
            ],
            overview: vec![
                metric("Completion Rate", 95),
                metric("Client Satisfaction", 98),
                metric("Code Quality", 92),
            ],
            skills: [
                "React", "TypeScript", "Next.js", "Python", "Node.js", "PostgreSQL",
                "MongoDB", "AI/ML", "AWS", "Docker", "GraphQL", "REST APIs",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Portfolio {
    /// Load content from a JSON file; missing fields keep their defaults.
    pub fn load_from_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading portfolio {}", path.display()))?;
        let portfolio = serde_json::from_str(&content)
            .with_context(|| format!("parsing portfolio {}", path.display()))?;
        Ok(portfolio)
    }

    /// Suggested prompt at `index`, if any.
    pub fn suggestion(&self, index: usize) -> Option<&str> {
        self.suggested_prompts.get(index).map(String::as_str)
    }
}
