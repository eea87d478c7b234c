use std::io::{self, BufRead};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Sender};
use log::{debug, info, warn};
use swiftread_core::input::ReaderCommand;

use super::COMMAND_QUEUE_DEPTH;

pub(super) type CommandSender =
    Sender<'static, CriticalSectionRawMutex, ReaderCommand, COMMAND_QUEUE_DEPTH>;

pub(super) const HELP: &str = "keys: <enter>/p play-pause | h/l jump | g N seek | c list | c N chapter | \
w N wpm | +/- speed | a align | q quit";

/// Blocking stdin reader; runs on its own thread and feeds the executor.
pub(super) fn run(commands: CommandSender) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("input: stdin read failed err={}", err);
                break;
            }
        };

        match ReaderCommand::parse(&line) {
            Some(command) => {
                debug!("input: command={:?}", command);
                embassy_futures::block_on(commands.send(command));
                if command == ReaderCommand::Quit {
                    return;
                }
            }
            None => println!("{HELP}"),
        }
    }

    info!("input: stdin closed");
    embassy_futures::block_on(commands.send(ReaderCommand::Quit));
}
