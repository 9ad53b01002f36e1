//! Console entry point.

use std::io::{self, BufRead, Write};

use anyhow::Context;

use tally_desktop::{Console, Reply, Session, SessionConfig};

fn main() -> anyhow::Result<()> {
    tally_observability::init();

    let config = SessionConfig::from_env().context("invalid configuration")?;
    let mut session = Session::new(&config).context("invalid session configuration")?;
    session.init();

    let mut console = Console::new(session);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "tally: type `help` for commands")?;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match console.handle_line(&line) {
            Reply::Lines(lines) => {
                for l in lines {
                    writeln!(stdout, "{l}")?;
                }
            }
            Reply::Quit => break,
        }
        stdout.flush()?;
    }

    tracing::info!("console closed");
    Ok(())
}
