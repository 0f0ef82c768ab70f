use std::error::Error;

use chrono::{Local, Utc};
use clap::Parser;
use log::{error, info, warn};
use portal::{
    announcements::{create_announcement, feed, list_announcements, AnnouncementDraft, Viewer},
    api::{
        models::{AttendanceStatus, ClassScope, ProfileUpdate},
        ApiClient, ApiError,
    },
    attendance::{
        calendar::render_grid,
        dates::Month,
        sheet::{AttendanceSheet, SheetError},
        source::load_calendar,
    },
    batch::BatchError,
    leaves::{list_leaves, update_status, LeaveDecision, LeaveStatus},
    models::{load_figment, Args, Command, Config, DecisionArg},
    results::{
        entry::{load_results, recalculate_results, save_results},
        models::{parse_mark_entry, ResultRow, ResultScope},
    },
    session::{SessionStore, UserCache},
};

fn print_results(rows: &[ResultRow]) {
    println!(
        "{:<12} {:<28} {:>8} {:>9} {:>7}  state",
        "student", "name", "theory", "practical", "total"
    );
    for row in rows {
        println!(
            "{:<12} {:<28} {:>8.2} {:>9.2} {:>7.2}  {}",
            row.student_id,
            row.student_name,
            row.theory_marks,
            row.practical_marks,
            row.total(),
            if row.is_locked { "locked" } else { "editable" }
        );
    }
}

fn session_expired(err: &(dyn Error + 'static)) -> bool {
    if let Some(SheetError::Api(inner)) = err.downcast_ref::<SheetError>() {
        return inner.is_unauthorized();
    }
    if let Some(BatchError::Api(inner)) = err.downcast_ref::<BatchError>() {
        return inner.is_unauthorized();
    }
    err.downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_unauthorized)
}

async fn execute(
    api: &ApiClient,
    cache: &mut UserCache,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Login { email, password } => {
            let user = api.login(&email, &password).await?;
            println!(
                "Logged in as {} {} ({:?})",
                user.first_name, user.last_name, user.role
            );
            cache.store(user);
        }
        Command::Logout => {
            api.logout(cache);
            println!("Logged out");
        }
        Command::Whoami => {
            if !api.is_logged_in() {
                return Err("Not logged in. Run `portal login` first.".into());
            }
            let user = cache.get_or_fetch(api).await?;
            println!(
                "{} {} <{}> ({:?})",
                user.first_name, user.last_name, user.email, user.role
            );
        }
        Command::UpdateProfile {
            first_name,
            last_name,
            phone,
        } => {
            let update = ProfileUpdate {
                first_name,
                last_name,
                phone,
            };
            if update == ProfileUpdate::default() {
                return Err("nothing to update".into());
            }
            let user = api.update_profile(&update, cache).await?;
            println!("Profile updated for {} {}", user.first_name, user.last_name);
        }
        Command::Classes => {
            let classes = api.classes().await?;
            let ids = classes.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
            let sections = api.sections_for_classes(&ids).await;
            if sections.unauthorized() {
                return Err(ApiError::Unauthorized.into());
            }
            for class in classes.iter() {
                let names = sections
                    .succeeded
                    .iter()
                    .find(|(id, _)| *id == class.id)
                    .map(|(_, list)| {
                        list.iter()
                            .map(|s| format!("{} ({})", s.name, s.id))
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_else(|| "?".to_owned());
                println!("{} ({}): {}", class.name, class.id, names);
            }
            if !sections.is_complete() {
                eprintln!("{}", sections.summary("section lookups"));
            }
        }
        Command::Calendar { scope, month, json } => {
            let today = Local::now().date_naive();
            let month = month.unwrap_or_else(|| Month::containing(today));
            let days = load_calendar(api, &scope.into(), month, today).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&days)?);
            } else {
                print!("{}", render_grid(month, &days));
            }
        }
        Command::Mark {
            scope,
            date,
            absent,
            late,
            half_day,
            excused,
        } => {
            let scope: ClassScope = scope.into();
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let students = api.students(&scope).await?;
            let mut sheet = AttendanceSheet::for_students(scope, date, &students);
            for (ids, status) in [
                (absent, AttendanceStatus::Absent),
                (late, AttendanceStatus::Late),
                (half_day, AttendanceStatus::HalfDay),
                (excused, AttendanceStatus::Excused),
            ] {
                for id in ids {
                    sheet.set_status(&id, status, None)?;
                }
            }
            let message = sheet.submit(api).await?;
            println!(
                "{}",
                message.unwrap_or_else(|| format!("Attendance saved for {}", date))
            );
        }
        Command::Results { scope } => {
            let rows = load_results(api, &scope.into()).await?;
            print_results(&rows);
        }
        Command::SaveResults { scope, marks } => {
            let scope: ResultScope = scope.into();
            let mut rows = load_results(api, &scope).await?;
            for entry in marks.iter() {
                let (student_id, theory, practical) = parse_mark_entry(entry)?;
                let Some(row) = rows.iter_mut().find(|row| row.student_id == student_id) else {
                    warn!("Student {} is not in this table", student_id);
                    eprintln!("Skipping {}: not enrolled in this section", student_id);
                    continue;
                };
                if let Err(err) = row.set_marks(theory, practical) {
                    eprintln!("Skipping {}: {}", student_id, err);
                }
            }
            let outcome = save_results(api, &scope, &rows).await?;
            println!("{}", outcome.into_summary("result saves")?);
        }
        Command::Recalculate {
            class_id,
            section_id,
            academic_year,
            term,
        } => {
            let message = recalculate_results(
                api,
                &class_id,
                section_id.as_deref(),
                &academic_year,
                &term,
            )
            .await?;
            println!(
                "{}",
                message.unwrap_or_else(|| "Recalculation requested".to_owned())
            );
        }
        Command::Leaves { pending } => {
            let leaves = list_leaves(api, pending.then_some(LeaveStatus::Pending)).await?;
            for leave in leaves.iter() {
                println!(
                    "{} {:?} {} {}..{} {:?}{}",
                    leave.id,
                    leave.applicant_type,
                    leave.applicant_name.as_deref().unwrap_or("-"),
                    leave.from_date,
                    leave.to_date,
                    leave.status,
                    if leave.is_actionable() {
                        "  [approve|reject]"
                    } else {
                        ""
                    }
                );
            }
        }
        Command::DecideLeave {
            leave_id,
            decision,
            remarks,
        } => {
            let decision = match decision {
                DecisionArg::Approve => LeaveDecision::Approved,
                DecisionArg::Reject => LeaveDecision::Rejected,
            };
            let leave = update_status(api, &leave_id, decision, remarks.as_deref()).await?;
            println!("Leave {} is now {:?}", leave.id, leave.status);
        }
        Command::Announcements {
            class_id,
            section_id,
        } => {
            let role = cache.get_or_fetch(api).await?.role;
            let viewer = Viewer {
                role,
                class_id,
                section_id,
            };
            let announcements = list_announcements(api).await?;
            for item in feed(&announcements, &viewer, Utc::now()) {
                println!("[{:?}] {}\n    {}", item.priority, item.title, item.content);
            }
        }
        Command::Announce {
            title,
            content,
            priority,
            roles,
            classes,
            sections,
            expires_at,
        } => {
            let draft = AnnouncementDraft {
                title,
                content,
                priority: priority.into(),
                target_roles: roles.into_iter().map(Into::into).collect(),
                target_classes: classes,
                target_sections: sections,
                expires_at,
            };
            let published = create_announcement(api, &draft).await?;
            println!("Published announcement {}", published.id);
        }
        Command::Holidays { upcoming } => {
            let holidays = if upcoming {
                api.upcoming_holidays().await?
            } else {
                api.holidays().await?
            };
            for holiday in holidays.iter() {
                println!("{}  {}", holiday.date, holiday.name);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    /* Setup logging */
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .init();

    /* Get all the required resources */
    let args = Args::parse();
    let config: Config = load_figment(&args.config_json_path)?.extract()?;
    let api = ApiClient::new(
        &config.api_base_url,
        SessionStore::new(config.session_path.clone()),
    );
    let mut cache = UserCache::new();
    info!("Using backend {}", config.api_base_url);

    /* Failures are reported, whatever was shown before stays as it was */
    if let Err(err) = execute(&api, &mut cache, args.command).await {
        error!("Command failed: {}", err);
        if session_expired(&*err) {
            cache.invalidate();
            eprintln!("Your session has expired. Run `portal login` to sign in again.");
        } else {
            eprintln!("{}", err);
        }
        std::process::exit(1);
    }
    Ok(())
}
