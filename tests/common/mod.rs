// Shared fixtures for portfolio-lens integration tests
#![allow(dead_code)]

use portfolio_lens::{AnalysisConfig, ProjectInput, ProjectRecord};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Builder for project input documents as the external parser emits them.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    doc: Value,
}

impl ProjectFixture {
    pub fn new(id: &str, contract: f64) -> Self {
        Self {
            doc: json!({
                "id": id,
                "project_info": { "Project Name": format!("Project {id}") },
                "revenues": {
                    "contract_price": { "n_ptd": contract, "n1_ptd": contract },
                    "revenues": { "n_ptd": contract * 0.4, "n1_ptd": contract * 0.3 },
                    "poc": { "n_ptd": 40.0, "n1_ptd": 30.0 }
                },
                "costs": {
                    "selling_price": { "as_sold": contract, "fct_n1": contract, "fct_n": contract },
                    "external_costs": {
                        "as_sold": contract * 0.7, "fct_n1": contract * 0.7, "fct_n": contract * 0.7
                    },
                    "internal_costs": {
                        "as_sold": contract * 0.1, "fct_n1": contract * 0.1, "fct_n": contract * 0.1
                    },
                    "totals": {
                        "as_sold": contract * 0.8,
                        "committed": contract * 0.6,
                        "fct_n": contract * 0.8,
                        "fct_n1": contract * 0.8,
                        "actuals": contract * 0.3
                    }
                },
                "quarterly": {},
                "work_packages": []
            }),
        }
    }

    pub fn poc(mut self, current: f64, previous: f64) -> Self {
        self.doc["revenues"]["poc"] = json!({ "n_ptd": current, "n1_ptd": previous });
        self
    }

    pub fn cm2_path(mut self, as_sold: f64, fct_n1: f64, fct_n: f64) -> Self {
        // with no internal costs, CM2 % is (price - external) / price
        let price = self.doc["revenues"]["contract_price"]["n_ptd"].as_f64().unwrap_or(0.0);
        let ext = |pct: f64| price * (100.0 - pct) / 100.0;
        self.doc["costs"]["external_costs"] =
            json!({ "as_sold": ext(as_sold), "fct_n1": ext(fct_n1), "fct_n": ext(fct_n) });
        self.doc["costs"]["internal_costs"] = json!({ "as_sold": 0.0, "fct_n1": 0.0, "fct_n": 0.0 });
        self
    }

    pub fn work_package(mut self, code: &str, description: &str, as_sold: f64, fct_n1: f64, fct_n: f64) -> Self {
        if let Some(packages) = self.doc["work_packages"].as_array_mut() {
            packages.push(json!({
                "code": code,
                "description": description,
                "as_sold": as_sold,
                "committed": 0.0,
                "fct_n1": fct_n1,
                "fct_n": fct_n
            }));
        }
        self
    }

    pub fn contingency(self, as_sold: f64, fct_n1: f64, fct_n: f64) -> Self {
        self.work_package("RC", "Risk contingency", as_sold, fct_n1, fct_n)
    }

    pub fn quarter(mut self, quarter: &str, actuals: f64, budget: f64) -> Self {
        self.doc["quarterly"][quarter] = json!({ "actuals": actuals, "budget": budget });
        self
    }

    pub fn json(&self) -> String {
        serde_json::to_string_pretty(&self.doc).unwrap()
    }

    pub fn input(&self) -> ProjectInput {
        serde_json::from_value(self.doc.clone()).unwrap()
    }

    pub fn record(&self, config: &AnalysisConfig) -> ProjectRecord {
        ProjectRecord::derive(self.input().normalize(), config)
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        fs::write(&path, self.json()).unwrap();
        path
    }
}
