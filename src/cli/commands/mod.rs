mod availability;
mod check;
mod init;
mod mood;

pub use availability::cmd_availability;
pub use check::cmd_check;
pub use init::cmd_init;
pub use mood::{cmd_list_moods, cmd_mood};

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
