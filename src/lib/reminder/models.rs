use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::api::models::ClassScope;

/// A model for describing class teachers who get reminders.
/// Consists of:
/// 1. Teacher's name. Should be full, because it will be written in the beginning of the letter
/// 2. Teacher's email address to which they will receive letters
/// 3. The class and section the teacher takes attendance for
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassTeacher {
    pub name: String,
    pub email: String,
    pub class_id: String,
    pub section_id: String,
    #[serde(default)]
    pub class_label: Option<String>,
}

impl ClassTeacher {
    pub fn scope(&self) -> ClassScope {
        ClassScope {
            class_id: self.class_id.clone(),
            section_id: self.section_id.clone(),
        }
    }

    pub fn label(&self) -> String {
        self.class_label
            .clone()
            .unwrap_or_else(|| format!("{} / {}", self.class_id, self.section_id))
    }
}

/// A model for describing ARGS of the reminder tool.
/// Consists of:
/// 1. Path to config.json, that contains the backend address and email sender configuration parameters.
/// 2. Path to class_teachers.json, that lists who takes attendance for which section.
/// 3. The day to treat as today, mostly for re-running a missed reminder.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[arg(long, value_name = "FILE", default_value = "class_teachers.json")]
    pub class_teachers_json_path: PathBuf,
    #[arg(long)]
    pub today: Option<NaiveDate>,
}
