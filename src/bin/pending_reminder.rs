use std::error::Error;

use chrono::Local;
use clap::Parser;
use lettre::{
    transport::smtp::authentication::{Credentials, Mechanism},
    SmtpTransport,
};
use log::info;
use portal::{
    api::ApiClient,
    models::{load_figment, Config, MailConfig},
    reminder::{models::Args, run_tool::run},
    session::SessionStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    /* Setup logging */
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .init();

    /* Get all the required resources */
    let args = Args::parse();
    let figment = load_figment(&args.config_json_path)?;
    let config: Config = figment.extract()?;
    let mail_config: MailConfig = figment.extract()?;
    let api = ApiClient::new(
        &config.api_base_url,
        SessionStore::new(config.session_path.clone()),
    );
    let sender = SmtpTransport::relay(&mail_config.email_relay)?
        .credentials(Credentials::new(
            mail_config.email_sender_username.to_owned(),
            mail_config.email_sender_password.to_owned(),
        ))
        .authentication(vec![Mechanism::Plain])
        .build();

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let sent = run(&api, &sender, &args, &mail_config, today).await?;
    info!("Sent {} reminder(s) for {}", sent, today);
    Ok(())
}
