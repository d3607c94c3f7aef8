use super::*;
use crate::completion::RecordingHost;
use crate::grammar::{Arg, Grammar};

fn command_set() -> CommandSet {
    let stop = Grammar::builder("stop")
        .description("Stop a service")
        .arg(Arg::positional("service").help("service to stop"))
        .build()
        .unwrap();
    CommandSet::from_grammars(vec![stop]).unwrap()
}

#[test]
fn test_respond_echoes_known_command() {
    let host = RecordingHost::new();
    assert_eq!(
        respond(&command_set(), &host, "  stop web  "),
        Some("stop web".to_string())
    );
}

#[test]
fn test_respond_ignores_blank_line() {
    let host = RecordingHost::new();
    assert_eq!(respond(&command_set(), &host, "   "), None);
}

#[test]
fn test_respond_unknown_command() {
    let host = RecordingHost::new();
    assert_eq!(
        respond(&command_set(), &host, "start web"),
        Some("Unknown command: start".to_string())
    );
}

#[test]
fn test_respond_help() {
    let host = RecordingHost::new();
    let listing = respond(&command_set(), &host, "help").unwrap();
    assert!(listing.contains("stop  Stop a service"));

    let help = respond(&command_set(), &host, "help stop").unwrap();
    assert!(help.starts_with("usage: stop service"));
    assert!(help.contains("service to stop"));
}
