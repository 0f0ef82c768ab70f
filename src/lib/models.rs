use std::{error::Error, path::PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use log::info;
use serde::Deserialize;

use crate::{
    announcements::Priority,
    api::models::{ClassScope, Role, Timestamp},
    attendance::dates::Month,
    results::models::ResultScope,
};

/// A model for describing configuration of the tools.
/// Consists of:
/// 1. Base URL of the backend's REST API, e.g. `https://school.example/api`
/// 2. Path of the file the bearer token is kept in between runs
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("session.json")
}

/// A model for describing the email sender.
/// Consists of:
/// 1. SMTP server address
/// 2. Email address from which the letters will be sent
/// 3. Email sender display name, that will be shown in the letter
/// 4. Password for email account from which the letters will be sent
#[derive(Deserialize, Debug, Clone)]
pub struct MailConfig {
    pub email_relay: String,
    pub email_sender_username: String,
    pub email_sender_fullname: String,
    pub email_sender_password: String,
}

/// Reads `config.json`, letting `PORTAL_*` environment variables override it.
pub fn load_figment(config_json_path: &PathBuf) -> Result<Figment, Box<dyn Error>> {
    info!(
        "Read config.json from {}",
        std::path::absolute(config_json_path)?.display()
    );
    Ok(Figment::new()
        .merge(Json::file(config_json_path))
        .merge(Env::prefixed("PORTAL_")))
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and keep the token for later commands
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD")]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Change the logged-in user's name or phone
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// List classes and their sections
    Classes,
    /// Attendance calendar for a class teacher's section
    Calendar {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Month as YYYY-MM, current month if omitted
        #[arg(long)]
        month: Option<Month>,
        /// Print JSON instead of a grid
        #[arg(long)]
        json: bool,
    },
    /// Mark attendance for one day; everyone not listed is present
    Mark {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, value_delimiter = ',')]
        absent: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        late: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        half_day: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        excused: Vec<String>,
    },
    /// Show the subject result table
    Results {
        #[command(flatten)]
        scope: ResultArgs,
    },
    /// Enter marks as STUDENT_ID=THEORY/PRACTICAL and save the editable rows
    SaveResults {
        #[command(flatten)]
        scope: ResultArgs,
        #[arg(required = true)]
        marks: Vec<String>,
    },
    /// Ask the backend to recompute overall results
    Recalculate {
        #[arg(long)]
        class_id: String,
        #[arg(long)]
        section_id: Option<String>,
        #[arg(long)]
        academic_year: String,
        #[arg(long)]
        term: String,
    },
    /// List leave applications
    Leaves {
        #[arg(long)]
        pending: bool,
    },
    /// Approve or reject a pending leave application
    DecideLeave {
        leave_id: String,
        #[arg(value_enum)]
        decision: DecisionArg,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Active announcements for the logged-in user
    Announcements {
        #[arg(long)]
        class_id: Option<String>,
        #[arg(long)]
        section_id: Option<String>,
    },
    /// Publish an announcement; empty target lists address everybody
    Announce {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long, value_enum, default_value = "normal")]
        priority: PriorityArg,
        #[arg(long, value_enum, value_delimiter = ',')]
        roles: Vec<RoleArg>,
        #[arg(long, value_delimiter = ',')]
        classes: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,
        /// RFC 3339 timestamp after which the announcement is hidden
        #[arg(long)]
        expires_at: Option<Timestamp>,
    },
    /// Holidays, or only upcoming ones
    Holidays {
        #[arg(long)]
        upcoming: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScopeArgs {
    #[arg(long)]
    pub class_id: String,
    #[arg(long)]
    pub section_id: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ResultArgs {
    #[arg(long)]
    pub class_id: String,
    #[arg(long)]
    pub section_id: String,
    #[arg(long)]
    pub subject_id: String,
    #[arg(long)]
    pub academic_year: String,
    #[arg(long)]
    pub term: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionArg {
    Approve,
    Reject,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityArg {
    Low,
    Normal,
    High,
    Urgent,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleArg {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Normal => Priority::Normal,
            PriorityArg::High => Priority::High,
            PriorityArg::Urgent => Priority::Urgent,
        }
    }
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Role::Admin,
            RoleArg::Teacher => Role::Teacher,
            RoleArg::Student => Role::Student,
            RoleArg::Parent => Role::Parent,
        }
    }
}

impl From<ScopeArgs> for ClassScope {
    fn from(args: ScopeArgs) -> Self {
        ClassScope {
            class_id: args.class_id,
            section_id: args.section_id,
        }
    }
}

impl From<ResultArgs> for ResultScope {
    fn from(args: ResultArgs) -> Self {
        ResultScope {
            class_id: args.class_id,
            section_id: args.section_id,
            subject_id: args.subject_id,
            academic_year: args.academic_year,
            term: args.term,
        }
    }
}
