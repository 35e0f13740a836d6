use pausesync::{
    strip_markup, GameState, OverlayCorner, PauseCoordinator, PauseMirror, PauseNotice, Peer,
    PeerId, Settings, StateChange,
};

fn peer(id: u32, admin: bool) -> Peer {
    Peer {
        id: PeerId(id),
        name: format!("peer-{id}"),
        color: 0xffffff,
        admin,
    }
}

#[test]
fn non_admin_request_is_denied_by_default() {
    let mut coordinator = PauseCoordinator::new(GameState::Playing);
    let change = coordinator.handle_toggle_request(&peer(2, false), &Settings::default());
    assert_eq!(change, None);
    assert_eq!(coordinator.state(), GameState::Playing);
    assert_eq!(coordinator.last_changed_by(), None);
}

#[test]
fn admin_request_pauses() {
    let mut coordinator = PauseCoordinator::new(GameState::Playing);
    let change = coordinator.handle_toggle_request(&peer(2, true), &Settings::default());
    assert_eq!(
        change,
        Some(StateChange {
            by: PeerId(2),
            paused: true
        })
    );
    assert_eq!(coordinator.state(), GameState::Paused);
    assert_eq!(coordinator.last_changed_by(), Some(PeerId(2)));
}

#[test]
fn allow_any_admits_regular_peers() {
    let settings = Settings {
        allow_any_pause: true,
        ..Settings::default()
    };
    let mut coordinator = PauseCoordinator::new(GameState::Playing);
    let change = coordinator.handle_toggle_request(&peer(3, false), &settings);
    assert!(matches!(change, Some(StateChange { paused: true, .. })));
}

#[test]
fn menu_rejects_even_admins() {
    let mut coordinator = PauseCoordinator::new(GameState::Menu);
    let change = coordinator.handle_toggle_request(&peer(2, true), &Settings::default());
    assert_eq!(change, None);
    assert_eq!(coordinator.state(), GameState::Menu);
}

#[test]
fn toggle_alternates_between_paused_and_playing() {
    let mut coordinator = PauseCoordinator::new(GameState::Playing);
    let admin = peer(2, true);
    let settings = Settings::default();
    let first = coordinator.handle_toggle_request(&admin, &settings).unwrap();
    assert!(first.paused);
    let second = coordinator.handle_toggle_request(&admin, &settings).unwrap();
    assert!(!second.paused);
    assert_eq!(coordinator.state(), GameState::Playing);
}

#[test]
fn local_toggle_skips_privilege_but_not_menu() {
    let mut coordinator = PauseCoordinator::new(GameState::Playing);
    let change = coordinator.toggle_local(PeerId(1)).unwrap();
    assert!(change.paused);
    coordinator.set_state(GameState::Menu);
    assert_eq!(coordinator.toggle_local(PeerId(1)), None);
}

#[test]
fn mirror_follows_broadcast_flags() {
    let mut mirror = PauseMirror::new(GameState::Playing);
    mirror.apply(true);
    assert_eq!(mirror.state(), GameState::Paused);
    mirror.apply(false);
    assert_eq!(mirror.state(), GameState::Playing);
    // Broadcasts are authoritative, even out of the menu.
    mirror.set_state(GameState::Menu);
    mirror.apply(true);
    assert!(mirror.is_paused());
}

#[test]
fn notice_text_attributes_the_change() {
    let notice = PauseNotice {
        by: Some("Alice".into()),
        paused: true,
    };
    assert_eq!(notice.to_string(), "Alice paused the game.");
    let notice = PauseNotice {
        by: None,
        paused: false,
    };
    assert_eq!(notice.to_string(), "Unknown player unpaused the game.");
}

#[test]
fn markup_is_stripped_from_names() {
    assert_eq!(strip_markup("[red]Alice[]"), "Alice");
    assert_eq!(strip_markup("plain"), "plain");
    assert_eq!(strip_markup("[[literal"), "[literal");
    assert_eq!(strip_markup("[#ff0000]x[] [blue]y[]"), "x y");
    // An unterminated tag swallows the rest.
    assert_eq!(strip_markup("oops[red"), "oops");
}

#[test]
fn settings_defaults_match_shipping_values() {
    let settings = Settings::default();
    assert!(settings.toasts);
    assert!(!settings.allow_any_pause);
    assert!(!settings.resync_on_pause);
    assert!(!settings.resync_on_unpause);
    assert!(!settings.schedule_resync);
    assert!(settings.show_other_previews);
    assert!(settings.show_preview_names);
    assert_eq!(settings.overlay_corner, OverlayCorner::TopLeft);
}

#[test]
fn settings_resync_switches_are_independent() {
    let settings = Settings {
        resync_on_pause: true,
        ..Settings::default()
    };
    assert!(settings.resync_on(true));
    assert!(!settings.resync_on(false));
}

#[test]
fn settings_round_trip_through_a_file() {
    let path = std::env::temp_dir().join(format!("pausesync-settings-{}.json", std::process::id()));
    let settings = Settings {
        allow_any_pause: true,
        schedule_resync: true,
        overlay_corner: OverlayCorner::BottomRight,
        ..Settings::default()
    };
    settings.save(&path).unwrap();
    let loaded = Settings::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn settings_tolerate_missing_and_unknown_fields() {
    let loaded: Settings =
        serde_json::from_str(r#"{"toasts":false,"some_future_knob":1}"#).unwrap();
    assert!(!loaded.toasts);
    assert!(!loaded.allow_any_pause);
    assert!(loaded.show_other_previews);
}
