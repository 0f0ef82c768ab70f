use std::error::Error;

use chrono::NaiveDate;
use log::info;

use super::{
    helpers::{due_pending_by_scope, get_class_teachers},
    letter_sender::LetterSender,
    models::Args,
    pending_getter::PendingDaysGetter,
};
use crate::models::MailConfig;

pub async fn run<PG: PendingDaysGetter, LS: LetterSender>(
    pending_getter: &PG,
    letter_sender: &LS,
    args: &Args,
    config: &MailConfig,
    today: NaiveDate,
) -> Result<usize, Box<dyn Error>> {
    let teachers = get_class_teachers(args)?;
    info!("Found {} class teachers", teachers.len());
    let (pending, holidays) = futures::join!(
        pending_getter.get_pending_days(&teachers),
        pending_getter.get_holidays()
    );
    let due = due_pending_by_scope(pending, &holidays, today);
    info!("Found {} sections with pending attendance", due.len());
    letter_sender.form_and_send_letters(&teachers, config, &due)
}
