use std::{collections::BTreeMap, error::Error, fmt::Debug};

use chrono::NaiveDate;
use lettre::Transport;
use log::info;

use super::{helpers::generate_email, models::ClassTeacher};
use crate::{api::models::ClassScope, models::MailConfig};

/// A trait, necessary for every entity that will build and send letters.
pub trait LetterSender {
    /// Returns how many letters went out.
    fn form_and_send_letters(
        &self,
        teachers: &[ClassTeacher],
        config: &MailConfig,
        pending: &BTreeMap<ClassScope, Vec<NaiveDate>>,
    ) -> Result<usize, Box<dyn Error>>;
}

/// Allows any lettre transport to form and send letters via its native send method.
impl<T> LetterSender for T
where
    T: Transport,
    T::Ok: Debug,
    T::Error: Error + 'static,
{
    fn form_and_send_letters(
        &self,
        teachers: &[ClassTeacher],
        config: &MailConfig,
        pending: &BTreeMap<ClassScope, Vec<NaiveDate>>,
    ) -> Result<usize, Box<dyn Error>> {
        let mut sent = 0;
        for teacher in teachers.iter() {
            let Some(days) = pending.get(&teacher.scope()) else {
                continue;
            };
            let email = generate_email(config, teacher, days)?;
            let code = self.send(&email)?;
            info!("Sent email to {} with response {:?}", teacher.name, code);
            sent += 1;
        }
        Ok(sent)
    }
}
