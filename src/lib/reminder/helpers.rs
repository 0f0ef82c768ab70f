use std::{
    collections::BTreeMap,
    error::Error,
    fs::File,
    io::BufReader,
};

use chrono::NaiveDate;
use lettre::{message::header::ContentType, Message};
use log::{debug, info};

use super::models::{Args, ClassTeacher};
use crate::{
    api::models::{ClassScope, Holiday},
    attendance::{
        calendar::{classify_day, CalendarInputs, DayStatus},
        dates::{format_date, Month},
    },
    models::MailConfig,
};

pub fn log_all_teachers(teachers: &[ClassTeacher]) {
    for teacher in teachers.iter() {
        debug!(
            "Serving {}, who takes attendance for class {} section {}",
            teacher.name, teacher.class_id, teacher.section_id
        );
    }
}

pub fn get_class_teachers(args: &Args) -> Result<Vec<ClassTeacher>, Box<dyn Error>> {
    info!(
        "Reading class_teachers.json from {}",
        std::path::absolute(&args.class_teachers_json_path)?.display()
    );
    let teachers_file = BufReader::new(File::open(&args.class_teachers_json_path)?);
    let teachers: Vec<ClassTeacher> = serde_json::from_reader(teachers_file)?;
    log_all_teachers(&teachers);
    Ok(teachers)
}

/* normalise, then keep only what the attendance calendar would show as pending */
pub fn due_pending_days(raw: &[String], holidays: &[Holiday], today: NaiveDate) -> Vec<NaiveDate> {
    let inputs = CalendarInputs::from_raw(
        raw.iter().map(String::as_str),
        std::iter::empty::<&str>(),
        holidays,
    );
    inputs
        .pending
        .iter()
        .copied()
        .filter(|date| {
            let status = classify_day(*date, Month::containing(*date), today, &inputs);
            if status != DayStatus::Pending {
                debug!("Pending date {} shows as {:?}, not reminding", date, status);
            }
            status == DayStatus::Pending
        })
        .collect()
}

pub fn due_pending_by_scope(
    raw: BTreeMap<ClassScope, Vec<String>>,
    holidays: &[Holiday],
    today: NaiveDate,
) -> BTreeMap<ClassScope, Vec<NaiveDate>> {
    raw.into_iter()
        .map(|(scope, dates)| {
            let due = due_pending_days(&dates, holidays, today);
            (scope, due)
        })
        .filter(|(_, due)| !due.is_empty())
        .collect()
}

/* form the letter body part listing the pending days */
pub fn format_pending_days(teacher: &ClassTeacher, days: &[NaiveDate]) -> String {
    format!(
        "Attendance has not been recorded for <b>{}</b> on the following day(s):<br>{}<br>",
        teacher.label(),
        days.iter()
            .map(|day| format!("    {} ({})", format_date(*day), day.format("%A")))
            .collect::<Vec<_>>()
            .join("<br>")
    )
}

pub fn generate_email(
    config: &MailConfig,
    teacher: &ClassTeacher,
    days: &[NaiveDate],
) -> Result<Message, Box<dyn Error>> {
    let email = Message::builder()
        .from(
            format!(
                "{} <{}>",
                config.email_sender_fullname, config.email_sender_username
            )
            .parse()?,
        )
        .to(format!("{} <{}>", teacher.name, teacher.email).parse()?)
        .subject(format!("Attendance pending for {} day(s)", days.len()))
        .header(ContentType::TEXT_HTML)
        .body(format!(
            "Dear {},<br><br>{}<br>This letter was generated automatically, please do not reply.",
            teacher.name,
            format_pending_days(teacher, days)
        ))?;

    Ok(email)
}
