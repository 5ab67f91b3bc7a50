use crate::cli::InfoArgs;
use crate::error::Result;
use crate::utils::report;
use neemp::{core::io::training::load_training_set, workflows};
use tracing::info;

pub fn run(args: InfoArgs) -> Result<()> {
    info!("Loading training set from {:?}", &args.training_set);
    let training_set = load_training_set(&args.training_set, args.classification.into())?;
    let summary = workflows::info::summarize(&training_set);
    print!("{}", report::training_set_report(&summary));
    Ok(())
}
