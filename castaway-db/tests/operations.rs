use castaway_catalog::{Player, Tribe, TribeName, TribeNameError};
use castaway_db::*;
use rusqlite::Connection;

const SERVER: i64 = 42;

fn setup_db() -> Connection {
    let conn = open_memory().unwrap();
    add_season(&conn, SERVER, "Alpha").unwrap();
    add_user(&conn, 100, "amy").unwrap();
    add_user(&conn, 101, "ben").unwrap();
    conn
}

fn count(conn: &Connection, sql: &str, id: i64) -> i64 {
    conn.query_row(sql, [id], |row| row.get(0)).unwrap()
}

fn player(conn: &Connection, name: &str) -> Player {
    find_player(
        conn,
        Scope::Server(SERVER),
        &PlayerFilter::Key(PlayerKey::DisplayName(name.into())),
    )
    .unwrap()
    .remove(0)
}

fn tribe(conn: &Connection, name: &str, iteration: i64) -> Tribe {
    find_tribe(
        conn,
        Scope::Server(SERVER),
        &TribeFilter::Key(TribeKey::name(name, iteration)),
    )
    .unwrap()
    .remove(0)
}

// ── Users ───────────────────────────────────────────────────────────────────

#[test]
fn add_user_reports_changes_only() {
    let conn = open_memory().unwrap();
    assert!(add_user(&conn, 5, "amy").unwrap());
    assert!(!add_user(&conn, 5, "amy").unwrap());
    assert!(!add_user(&conn, 5, "amy").unwrap());

    let before = find_user(&conn, 5).unwrap().unwrap();
    assert!(add_user(&conn, 5, "amy (new)").unwrap());
    let after = find_user(&conn, 5).unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.label.as_deref(), Some("amy (new)"));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

// ── Seasons ─────────────────────────────────────────────────────────────────

#[test]
fn add_season_three_way_outcome() {
    let conn = open_memory().unwrap();
    assert_eq!(add_season(&conn, 1, "Alpha").unwrap(), SeasonOutcome::Created);
    assert_eq!(add_season(&conn, 1, "Alpha").unwrap(), SeasonOutcome::Unchanged);
    let renamed = add_season(&conn, 1, "Beta").unwrap();
    assert_eq!(renamed, SeasonOutcome::Renamed);
    assert!(renamed.changed());
    assert!(!SeasonOutcome::Unchanged.changed());
    assert_eq!(find_season(&conn, 1).unwrap().unwrap().name, "Beta");
}

#[test]
fn activate_season_keeps_one_active() {
    let conn = open_memory().unwrap();
    add_season(&conn, 1, "Alpha").unwrap();
    add_season(&conn, 2, "Beta").unwrap();

    assert!(find_active_season(&conn).unwrap().is_none());

    let alpha = activate_season(&conn, 1).unwrap();
    assert!(alpha.is_active());
    assert_eq!(find_active_season(&conn).unwrap().unwrap().server_id, 1);

    activate_season(&conn, 2).unwrap();
    assert_eq!(find_active_season(&conn).unwrap().unwrap().server_id, 2);
    assert!(!find_season(&conn, 1).unwrap().unwrap().is_active());

    let active: i64 = conn
        .query_row("SELECT COUNT(*) FROM seasons WHERE status = 'active'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(active, 1);
}

#[test]
fn activate_unknown_season_leaves_current_active() {
    let conn = open_memory().unwrap();
    add_season(&conn, 1, "Alpha").unwrap();
    activate_season(&conn, 1).unwrap();

    let err = activate_season(&conn, 99).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Season));
    assert_eq!(find_active_season(&conn).unwrap().unwrap().server_id, 1);
}

#[test]
fn deactivate_season_reports_change() {
    let conn = open_memory().unwrap();
    add_season(&conn, 1, "Alpha").unwrap();
    activate_season(&conn, 1).unwrap();
    assert!(deactivate_season(&conn, 1).unwrap());
    assert!(!deactivate_season(&conn, 1).unwrap());
    assert!(find_active_season(&conn).unwrap().is_none());
    assert_eq!(deactivate_season(&conn, 2).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn advance_episode_counts_up() {
    let conn = setup_db();
    assert_eq!(advance_episode(&conn, SERVER).unwrap(), 1);
    assert_eq!(advance_episode(&conn, SERVER).unwrap(), 2);
    assert_eq!(find_season(&conn, SERVER).unwrap().unwrap().episode, 2);
    assert_eq!(
        advance_episode(&conn, 99).unwrap_err().missing_entity(),
        Some(Entity::Season)
    );
}

#[test]
fn delete_season_cascades() {
    let conn = setup_db();
    add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    add_player(&conn, &NewPlayer::new("Amy", 100, SERVER).tribe("Foxes", 1)).unwrap();
    add_player(&conn, &NewPlayer::new("Ben", 101, SERVER)).unwrap();

    add_season(&conn, 7, "Other").unwrap();
    add_tribe(&conn, &NewTribe::new("Foxes", 7)).unwrap();
    add_player(&conn, &NewPlayer::new("Amy", 100, 7)).unwrap();

    let season_id = find_season(&conn, SERVER).unwrap().unwrap().id;
    delete_season(&conn, SERVER).unwrap();

    assert!(find_season(&conn, SERVER).unwrap().is_none());
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM players WHERE season = ?1", season_id), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM tribes WHERE season = ?1", season_id), 0);

    // The other season is untouched, and users are never deleted.
    assert_eq!(find_player(&conn, Scope::Server(7), &PlayerFilter::All).unwrap().len(), 1);
    assert_eq!(find_tribe(&conn, Scope::Server(7), &TribeFilter::All).unwrap().len(), 1);
    assert!(find_user(&conn, 101).unwrap().is_some());
}

#[test]
fn delete_empty_season() {
    let conn = open_memory().unwrap();
    add_season(&conn, 1, "Alpha").unwrap();
    delete_season(&conn, 1).unwrap();
    assert!(find_season(&conn, 1).unwrap().is_none());
}

#[test]
fn delete_unknown_season_is_not_found() {
    let conn = open_memory().unwrap();
    let err = delete_season(&conn, 1).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Season));
}

// ── Tribes ──────────────────────────────────────────────────────────────────

#[test]
fn add_tribe_returns_created_record() {
    let conn = setup_db();
    let created = add_tribe(
        &conn,
        &NewTribe::new("Foxes", SERVER).iteration(2).color("ff8800").precedence(3),
    )
    .unwrap();
    assert_eq!(created.display_name(), "Foxes 2.0");
    assert_eq!(created.color, "ff8800");
    assert_eq!(created.precedence, 3);
    assert_eq!(tribe(&conn, "Foxes", 2).id, created.id);
}

#[test]
fn add_tribe_defaults() {
    let conn = setup_db();
    let tribe = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    assert_eq!(tribe.iteration, 1);
    assert_eq!(tribe.color, "d3d3d3");
    assert_eq!(tribe.precedence, 1);
}

#[test]
fn add_duplicate_tribe_conflicts_without_altering_row() {
    let conn = setup_db();
    let first = add_tribe(&conn, &NewTribe::new("Foxes", SERVER).color("111111")).unwrap();

    let err = add_tribe(&conn, &NewTribe::new("Foxes", SERVER).color("222222")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.conflict(), Some(ConflictKind::TribeExists));

    let stored = tribe(&conn, "Foxes", 1);
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.color, "111111");
}

#[test]
fn same_tribe_name_allowed_in_new_iteration_or_other_season() {
    let conn = setup_db();
    add_season(&conn, 7, "Other").unwrap();
    add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    add_tribe(&conn, &NewTribe::new("Foxes", SERVER).iteration(2)).unwrap();
    add_tribe(&conn, &NewTribe::new("Foxes", 7)).unwrap();
}

#[test]
fn add_tribe_without_season_is_not_found() {
    let conn = setup_db();
    let err = add_tribe(&conn, &NewTribe::new("Foxes", 999)).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Season));
}

#[test]
fn add_tribe_rejects_names_that_do_not_round_trip() {
    let conn = setup_db();
    let cases = [
        (NewTribe::new("Foxes", SERVER).iteration(0), TribeNameError::InvalidIteration(0)),
        (NewTribe::new("Hawks", SERVER).iteration(-3), TribeNameError::InvalidIteration(-3)),
        (NewTribe::new("Foxes 2.0", SERVER), TribeNameError::Ambiguous("Foxes 2.0".into())),
        (NewTribe::new("", SERVER), TribeNameError::Empty),
    ];
    for (new, expected) in cases {
        let err = add_tribe(&conn, &new).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        match err {
            OperationError::InvalidTribeName(e) => assert_eq!(e, expected),
            other => panic!("expected invalid tribe name, got {other:?}"),
        }
    }
    let tribes: i64 = conn
        .query_row("SELECT COUNT(*) FROM tribes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tribes, 0);
}

#[test]
fn add_tribe_accepts_suffix_in_name_at_later_iteration() {
    let conn = setup_db();
    let created = add_tribe(&conn, &NewTribe::new("Foxes 2.0", SERVER).iteration(3)).unwrap();
    let parsed: TribeName = created.display_name().parse().unwrap();
    assert_eq!(parsed, TribeName::new("Foxes 2.0", 3));
}

#[test]
fn edit_tribe_invalid_iteration_is_skipped_alone() {
    let conn = setup_db();
    let hawks = add_tribe(&conn, &NewTribe::new("Hawks", SERVER)).unwrap();

    for iteration in [0, -3] {
        let report = edit_tribe(
            &conn,
            Scope::Server(SERVER),
            TribeRef::from(&hawks),
            &TribeEdit {
                iteration: Some(iteration),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            report,
            TribeEditReport {
                changed: false,
                rename_rejected: true
            }
        );
    }

    let report = edit_tribe(
        &conn,
        Scope::Server(SERVER),
        TribeRef::from(&hawks),
        &TribeEdit {
            name: Some("Hawks 2.0".into()),
            color: Some("00ff00".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(report.changed);
    assert!(report.rename_rejected);

    let stored = tribe(&conn, "Hawks", 1);
    assert_eq!(stored, hawks);
    assert_eq!(stored.color, "00ff00");
    assert_eq!(stored.display_name().parse::<TribeName>().unwrap(), TribeName::new("Hawks", 1));
}

#[test]
fn edit_tribe_renames_and_recolors() {
    let conn = setup_db();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();

    let report = edit_tribe(
        &conn,
        Scope::Server(SERVER),
        TribeRef::from(&foxes),
        &TribeEdit {
            name: Some("Wolves".into()),
            iteration: Some(2),
            color: Some("abcdef".into()),
            precedence: Some(4),
        },
    )
    .unwrap();
    assert_eq!(
        report,
        TribeEditReport {
            changed: true,
            rename_rejected: false
        }
    );

    let stored = tribe(&conn, "Wolves", 2);
    assert_eq!(stored, foxes);
    assert_eq!(stored.color, "abcdef");
    assert_eq!(stored.precedence, 4);
}

#[test]
fn edit_tribe_iteration_only() {
    let conn = setup_db();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    let report = edit_tribe(
        &conn,
        Scope::Server(SERVER),
        TribeKey::name("Foxes", 1).into(),
        &TribeEdit {
            iteration: Some(3),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(report.changed);
    assert_eq!(tribe(&conn, "Foxes", 3), foxes);
}

#[test]
fn edit_tribe_noop_is_not_a_change() {
    let conn = setup_db();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    let report = edit_tribe(
        &conn,
        Scope::Server(SERVER),
        TribeKey::Id(foxes.id).into(),
        &TribeEdit {
            name: Some("Foxes".into()),
            color: Some("d3d3d3".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(report, TribeEditReport::default());
}

#[test]
fn edit_tribe_rename_conflict_is_skipped_alone() {
    let conn = setup_db();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    add_tribe(&conn, &NewTribe::new("Hawks", SERVER)).unwrap();

    let report = edit_tribe(
        &conn,
        Scope::Server(SERVER),
        TribeRef::from(&foxes),
        &TribeEdit {
            name: Some("Hawks".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        report,
        TribeEditReport {
            changed: false,
            rename_rejected: true
        }
    );
    assert_eq!(tribe(&conn, "Foxes", 1).id, foxes.id);
}

#[test]
fn edit_unknown_tribe_is_not_found() {
    let conn = setup_db();
    let err = edit_tribe(
        &conn,
        Scope::Server(SERVER),
        TribeKey::name("Nope", 1).into(),
        &TribeEdit::default(),
    )
    .unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Tribe));
}

#[test]
fn delete_tribe_releases_its_players_only() {
    let conn = setup_db();
    add_user(&conn, 102, "cat").unwrap();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    let hawks = add_tribe(&conn, &NewTribe::new("Hawks", SERVER)).unwrap();
    add_player(&conn, &NewPlayer::new("Amy", 100, SERVER).tribe("Foxes", 1)).unwrap();
    add_player(&conn, &NewPlayer::new("Ben", 101, SERVER).tribe("Foxes", 1)).unwrap();
    add_player(&conn, &NewPlayer::new("Cat", 102, SERVER).tribe("Hawks", 1)).unwrap();

    assert!(delete_tribe(&conn, Scope::Server(SERVER), TribeRef::from(&foxes)).unwrap());

    assert_eq!(player(&conn, "Amy").tribe_id, None);
    assert_eq!(player(&conn, "Ben").tribe_id, None);
    assert_eq!(player(&conn, "Cat").tribe_id, Some(hawks.id));
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM tribes WHERE id = ?1", foxes.id), 0);
}

#[test]
fn delete_tribe_without_players() {
    let conn = setup_db();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    assert!(delete_tribe(&conn, Scope::Server(SERVER), TribeKey::Id(foxes.id).into()).unwrap());

    let err = delete_tribe(&conn, Scope::Server(SERVER), TribeRef::from(&foxes)).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Tribe));
}

// ── Players ─────────────────────────────────────────────────────────────────

#[test]
fn add_player_returns_full_record() {
    let conn = setup_db();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    let created = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER).tribe("Foxes", 1)).unwrap();

    assert_eq!(created.tribe_id, Some(foxes.id));
    assert_eq!(created.user_id, find_user(&conn, 100).unwrap().unwrap().id);
    assert_eq!(created, player(&conn, "Amy"));
}

#[test]
fn add_player_without_tribe() {
    let conn = setup_db();
    let created = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER)).unwrap();
    assert_eq!(created.tribe_id, None);
}

#[test]
fn add_player_validation_order() {
    let conn = setup_db();
    add_player(&conn, &NewPlayer::new("Amy", 100, SERVER)).unwrap();

    // Unknown user is reported before unknown season or tribe.
    let err = add_player(&conn, &NewPlayer::new("Amy", 555, 999).tribe("Nope", 1)).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::User));

    // Unknown season before unknown tribe.
    let err = add_player(&conn, &NewPlayer::new("Amy", 100, 999).tribe("Nope", 1)).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Season));

    // Unknown tribe before any uniqueness check.
    let err = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER).tribe("Nope", 1)).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Tribe));

    // Display name before user.
    let err = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER)).unwrap_err();
    assert_eq!(err.conflict(), Some(ConflictKind::DisplayNameTaken));

    let err = add_player(&conn, &NewPlayer::new("Amy Again", 100, SERVER)).unwrap_err();
    assert_eq!(err.conflict(), Some(ConflictKind::UserAlreadyPlayer));
}

#[test]
fn display_name_taken_even_by_another_user() {
    let conn = setup_db();
    add_player(&conn, &NewPlayer::new("Amy", 100, SERVER)).unwrap();
    let err = add_player(&conn, &NewPlayer::new("Amy", 101, SERVER)).unwrap_err();
    assert_eq!(err.conflict(), Some(ConflictKind::DisplayNameTaken));
}

#[test]
fn edit_player_rename() {
    let conn = setup_db();
    let amy = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER)).unwrap();
    let edit = PlayerEdit {
        display_name: Some("Amelia".into()),
        ..Default::default()
    };
    assert!(edit_player(&conn, Scope::Server(SERVER), PlayerRef::from(&amy), &edit).unwrap());
    assert_eq!(player(&conn, "Amelia").id, amy.id);

    // Renaming to the current name is a no-op, not an error.
    let key = PlayerKey::Account(100).into();
    assert!(!edit_player(&conn, Scope::Server(SERVER), key, &edit).unwrap());
}

#[test]
fn edit_player_rename_conflict_changes_nothing() {
    let conn = setup_db();
    add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    let amy = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER)).unwrap();
    add_player(&conn, &NewPlayer::new("Ben", 101, SERVER)).unwrap();

    let edit = PlayerEdit {
        display_name: Some("Ben".into()),
        tribe: TribeAssignment::Set(TribeKey::name("Foxes", 1).into()),
    };
    let err = edit_player(&conn, Scope::Server(SERVER), PlayerRef::from(&amy), &edit).unwrap_err();
    assert_eq!(err.conflict(), Some(ConflictKind::DisplayNameTaken));

    let stored = player(&conn, "Amy");
    assert_eq!(stored.tribe_id, None);
}

#[test]
fn edit_player_change_and_clear_tribe() {
    let conn = setup_db();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER).precedence(2)).unwrap();
    let hawks = add_tribe(&conn, &NewTribe::new("Hawks", SERVER)).unwrap();
    let amy = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER).tribe("Foxes", 1)).unwrap();
    let scope = Scope::Server(SERVER);

    // Backwards moves are allowed; only clients warn about them.
    let to_hawks = PlayerEdit {
        tribe: TribeAssignment::Set(TribeRef::from(&hawks)),
        ..Default::default()
    };
    assert!(edit_player(&conn, scope, PlayerRef::from(&amy), &to_hawks).unwrap());
    assert_eq!(player(&conn, "Amy").tribe_id, Some(hawks.id));
    assert!(!edit_player(&conn, scope, PlayerRef::from(&amy), &to_hawks).unwrap());

    let clear = PlayerEdit {
        tribe: TribeAssignment::Clear,
        ..Default::default()
    };
    assert!(edit_player(&conn, scope, PlayerKey::DisplayName("Amy".into()).into(), &clear).unwrap());
    assert_eq!(player(&conn, "Amy").tribe_id, None);
    assert!(!edit_player(&conn, scope, PlayerRef::from(&amy), &clear).unwrap());

    let back = PlayerEdit {
        tribe: TribeAssignment::Set(TribeKey::Id(foxes.id).into()),
        ..Default::default()
    };
    assert!(edit_player(&conn, scope, PlayerKey::User(amy.user_id).into(), &back).unwrap());
    assert_eq!(player(&conn, "Amy").tribe_id, Some(foxes.id));
}

#[test]
fn edit_player_rejects_tribe_from_other_season() {
    let conn = setup_db();
    add_season(&conn, 7, "Other").unwrap();
    let elsewhere = add_tribe(&conn, &NewTribe::new("Foxes", 7)).unwrap();
    let amy = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER)).unwrap();

    let edit = PlayerEdit {
        tribe: TribeAssignment::Set(TribeRef::from(&elsewhere)),
        ..Default::default()
    };
    let err = edit_player(&conn, Scope::Server(SERVER), PlayerRef::from(&amy), &edit).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Tribe));
    assert_eq!(player(&conn, "Amy").tribe_id, None);
}

#[test]
fn edit_unknown_player_is_not_found() {
    let conn = setup_db();
    let err = edit_player(
        &conn,
        Scope::Server(SERVER),
        PlayerKey::DisplayName("Nobody".into()).into(),
        &PlayerEdit::default(),
    )
    .unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Player));
}

#[test]
fn delete_player_leaves_others_alone() {
    let conn = setup_db();
    let foxes = add_tribe(&conn, &NewTribe::new("Foxes", SERVER)).unwrap();
    let amy = add_player(&conn, &NewPlayer::new("Amy", 100, SERVER).tribe("Foxes", 1)).unwrap();
    add_player(&conn, &NewPlayer::new("Ben", 101, SERVER).tribe("Foxes", 1)).unwrap();

    assert!(delete_player(&conn, Scope::Server(SERVER), PlayerRef::from(&amy)).unwrap());
    assert_eq!(player(&conn, "Ben").tribe_id, Some(foxes.id));
    assert_eq!(tribe(&conn, "Foxes", 1), foxes);

    let err = delete_player(&conn, Scope::Server(SERVER), PlayerRef::from(&amy)).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Player));

    // The user can join again once their player is gone.
    add_player(&conn, &NewPlayer::new("Amy", 100, SERVER)).unwrap();
}

#[test]
fn mutations_against_unknown_scope_are_not_found() {
    let conn = setup_db();
    let err = delete_player(&conn, Scope::Season(999), PlayerKey::Id(1).into()).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Season));
    let err = delete_tribe(&conn, Scope::Server(999), TribeKey::Id(1).into()).unwrap_err();
    assert_eq!(err.missing_entity(), Some(Entity::Season));
}
