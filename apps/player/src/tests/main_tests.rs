use super::*;

#[test]
fn defaults_target_local_server_every_three_seconds() {
    let args = Args::parse_from(["player"]);
    assert_eq!(args.server_url, "http://localhost:8081");
    assert_eq!(args.name, None);
    assert_eq!(args.poll_interval_secs, DEFAULT_POLL_INTERVAL.as_secs());
    assert_eq!(args.poll_interval_secs, 3);
}

#[test]
fn name_and_interval_can_be_overridden() {
    let args = Args::parse_from(["player", "--name", "Alice", "--poll-interval-secs", "1"]);
    assert_eq!(args.name.as_deref(), Some("Alice"));
    assert_eq!(args.poll_interval_secs, 1);
}
