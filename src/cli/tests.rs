use super::*;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn no_subcommand_defaults_to_chat() {
    let args = parse_args(&["deskchat"]);

    assert!(args.command.is_none());
    assert!(args.endpoint.is_none());
    assert!(args.log.is_none());
}

#[test]
fn global_flags_parse_before_and_after_subcommand() {
    let args = parse_args(&[
        "deskchat",
        "-e",
        "ws://desk:9000/api/chat/ws",
        "chat",
        "--log",
        "session.log",
        "--probe",
        "Test connection",
    ]);

    assert!(matches!(args.command, Some(Commands::Chat)));
    assert_eq!(args.endpoint.as_deref(), Some("ws://desk:9000/api/chat/ws"));
    assert_eq!(args.log, Some(PathBuf::from("session.log")));
    assert_eq!(args.probe.as_deref(), Some("Test connection"));
}

#[test]
fn say_collects_every_word() {
    let args = parse_args(&["deskchat", "say", "what", "is", "-1", "plus", "one?"]);

    match args.command {
        Some(Commands::Say { prompt }) => {
            assert_eq!(prompt.join(" "), "what is -1 plus one?");
        }
        _ => panic!("expected say subcommand"),
    }
}

#[test]
fn say_requires_a_prompt() {
    assert!(Args::try_parse_from(["deskchat", "say"]).is_err());
}

#[test]
fn set_accepts_multi_word_values() {
    let args = parse_args(&["deskchat", "set", "probe", "Test", "connection"]);

    match args.command {
        Some(Commands::Set { key, value }) => {
            assert_eq!(key, "probe");
            assert_eq!(value.join(" "), "Test connection");
        }
        _ => panic!("expected set subcommand"),
    }
}

#[test]
fn set_without_value_parses() {
    let args = parse_args(&["deskchat", "set", "endpoint"]);

    assert!(matches!(
        args.command,
        Some(Commands::Set { ref value, .. }) if value.is_empty()
    ));
}

#[test]
fn trace_file_flag_is_global() {
    let args = parse_args(&["deskchat", "--trace-file", "trace.log", "say", "hi"]);

    assert_eq!(args.trace_file, Some(PathBuf::from("trace.log")));
    assert!(matches!(args.command, Some(Commands::Say { .. })));
}

#[test]
fn endpoint_flag_wins_over_config() {
    let args = parse_args(&["deskchat", "--endpoint", "ws://flag/ws"]);
    let config = Config {
        endpoint: Some("ws://config/ws".to_string()),
        ..Config::default()
    };

    assert_eq!(resolve_endpoint(&args, &config).unwrap(), "ws://flag/ws");
}

#[test]
fn invalid_endpoint_flag_is_rejected() {
    let args = parse_args(&["deskchat", "--endpoint", "http://desk/ws"]);

    assert!(matches!(
        resolve_endpoint(&args, &Config::default()),
        Err(ConfigError::InvalidEndpoint { .. })
    ));
}
