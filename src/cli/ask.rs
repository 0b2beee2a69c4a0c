//! Ask command - answers one question from the stored index

use clap::Args;

use super::{load_config, CommonArgs};
use crate::domain::answer::AnswerRequest;

#[derive(Args, Debug, Clone, Default)]
pub struct AskArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// The question to answer
    pub question: String,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    AnswerRequest::new(args.question.as_str()).validate()?;

    let config = load_config(&args.common)?;
    let services = crate::build_services(&config)?;

    services.index.ensure_ready(config.index.build_on_start).await?;

    let answer = services.answer.answer_question(&args.question).await;
    println!("{}", serde_json::to_string_pretty(&answer)?);

    Ok(())
}
