use slot_core::{
    admin::{
        self,
        AdminAllowlist,
    },
    analytics,
    balance::BalanceBackend,
    clock::Clock,
    settings::SettingsPatch,
    storage::GameStorage,
    test_helpers::TestContext,
};

#[test]
fn admin__settings_change_applies_to_next_spin_and_reset_restores_defaults() {
    // given
    let mut ctx = TestContext::new();
    let alice = ctx.alice();
    let patch = SettingsPatch {
        spin_cost: Some(20.0),
        initial_balance: Some(40.0),
        ..SettingsPatch::default()
    };
    admin::update_settings(ctx.machine().storage_mut(), &patch).unwrap();

    // when
    let report = ctx.machine().spin(&alice).unwrap();
    admin::reset_settings(ctx.machine().storage_mut()).unwrap();
    ctx.machine().spin(&alice).unwrap();

    // then
    assert_eq!(report.balance, 20.0 + report.outcome.prize);
    assert_eq!(ctx.storage().game_spins().unwrap()[0].spin_cost, 20.0);
    assert_eq!(ctx.storage().game_spins().unwrap()[1].spin_cost, 10.0);
}

#[test]
fn admin__overview_and_reset_balance() {
    // given
    let mut ctx = TestContext::new();
    let (alice, bob) = (ctx.alice(), ctx.bob());
    for _ in 0..3 {
        ctx.machine().spin(&alice).unwrap();
    }
    admin::block_user(ctx.machine().storage_mut(), &bob).unwrap();

    // when
    let reset_to = ctx.machine().reset_balance(&alice).unwrap();
    let overview = admin::user_overview(ctx.storage(), ctx.backend()).unwrap();

    // then
    assert_eq!(reset_to, 100.0);
    let alice_row = overview.iter().find(|row| row.id == alice).unwrap();
    assert_eq!(alice_row.spins, 3);
    assert_eq!(alice_row.balance, Some(100.0));
    assert!(!alice_row.blocked);
    let bob_row = overview.iter().find(|row| row.id == bob).unwrap();
    assert_eq!(bob_row.spins, 0);
    assert!(bob_row.blocked);
    assert_eq!(bob_row.balance, None);
    assert_eq!(ctx.backend().balance(&alice).unwrap(), Some(100.0));
}

#[test]
fn analytics__dashboard_reflects_recent_play() {
    // given
    let mut ctx = TestContext::with_seed(21);
    let (alice, bob) = (ctx.alice(), ctx.bob());
    ctx.machine().spin(&bob).unwrap();
    ctx.advance_days(10);
    for _ in 0..4 {
        ctx.machine().spin(&alice).unwrap();
    }

    // when
    let spins = ctx.storage().game_spins().unwrap();
    let users = ctx.backend().list_users().unwrap();
    let now = ctx.clock().now();
    let summary = analytics::dashboard_summary(&spins, users.len(), now);
    let series = analytics::daily_series(&spins, now, 7);
    let top = analytics::top_players(&spins, &ctx.storage().user_emails().unwrap(), 10);
    let distribution = analytics::outcome_distribution(&spins);

    // then
    assert_eq!(summary.total_users, 2);
    assert_eq!(summary.total_spins, 5);
    assert_eq!(summary.total_revenue, 50.0);
    assert_eq!(summary.active_users, 1);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].spins, 4);
    assert_eq!(top[0].email, "alice@example.com");
    assert_eq!(distribution.total(), 5);
}

#[test]
fn allowlist__accepts_configured_operators_only() {
    let allowlist = AdminAllowlist::new(["ops@example.com", "Admin@Example.com"]);

    assert!(allowlist.is_admin("OPS@example.com"));
    assert!(allowlist.is_admin("admin@example.com"));
    assert!(!allowlist.is_admin("alice@example.com"));
}
