use slot_core::{
    achievements,
    admin,
    balance::BalanceBackend,
    clock::Clock,
    leaderboard::{
        self,
        SortBy,
    },
    machine::SpinDenied,
    spending,
    storage::GameStorage,
    test_helpers::TestContext,
};
use std::collections::HashSet;

#[test]
fn spin__balance_tracks_cost_and_prizes_over_many_spins() {
    // given
    let mut ctx = TestContext::new();
    let alice = ctx.alice();
    ctx.machine().top_up(&alice, 1_000.0).unwrap();

    // when
    let mut last_balance = 0.0;
    for _ in 0..30 {
        last_balance = ctx.machine().spin(&alice).unwrap().balance;
    }

    // then
    let spins = ctx.storage().game_spins().unwrap();
    assert_eq!(spins.len(), 30);
    let net: f64 = spins.iter().map(|spin| spin.net()).sum();
    assert!((last_balance - (1_100.0 + net)).abs() < 1e-9);
    assert_eq!(ctx.backend().balance(&alice).unwrap(), Some(last_balance));
    let today = ctx.clock().today();
    assert_eq!(
        spending::today_spending(ctx.storage(), &alice, today).unwrap(),
        300.0
    );
}

#[test]
fn spin__each_achievement_is_reported_once() {
    // given
    let mut ctx = TestContext::with_seed(7);
    let alice = ctx.alice();
    ctx.machine().top_up(&alice, 10_000.0).unwrap();

    // when
    let mut reported = Vec::new();
    for _ in 0..60 {
        let report = ctx.machine().spin(&alice).unwrap();
        reported.extend(report.newly_unlocked.iter().map(|a| a.id));
    }

    // then
    let unique: HashSet<_> = reported.iter().copied().collect();
    assert_eq!(unique.len(), reported.len());
    assert!(unique.contains("first_spin"));
    assert!(unique.contains("ten_spins"));
    assert!(unique.contains("fifty_spins"));
    let stored = achievements::user_achievements(ctx.storage(), &alice).unwrap();
    assert_eq!(stored.len(), reported.len());
    assert!(stored.values().all(|state| state.unlocked));
}

#[test]
fn spin__daily_cap_resets_on_next_day() {
    // given
    let mut ctx = TestContext::new();
    let bob = ctx.bob();
    spending::set_daily_limit(ctx.machine().storage_mut(), &bob, 30.0).unwrap();
    ctx.machine().top_up(&bob, 500.0).unwrap();
    for _ in 0..3 {
        ctx.machine().spin(&bob).unwrap();
    }

    // when
    let refused = ctx.machine().spin(&bob).unwrap_err();
    ctx.advance_days(1);
    let next_day = ctx.machine().spin(&bob);

    // then
    assert_eq!(
        refused.downcast_ref::<SpinDenied>(),
        Some(&SpinDenied::DailyLimitReached {
            remaining: Some(0.0)
        })
    );
    assert!(next_day.is_ok());
    assert_eq!(ctx.storage().game_spins().unwrap().len(), 4);
}

#[test]
fn spin__blocked_player_is_refused_until_unblocked() {
    // given
    let mut ctx = TestContext::new();
    let alice = ctx.alice();
    ctx.machine().spin(&alice).unwrap();
    admin::block_user(ctx.machine().storage_mut(), &alice).unwrap();

    // when
    let refused = ctx.machine().spin(&alice).unwrap_err();
    admin::unblock_user(ctx.machine().storage_mut(), &alice).unwrap();
    let resumed = ctx.machine().spin(&alice);

    // then
    assert_eq!(
        refused.downcast_ref::<SpinDenied>(),
        Some(&SpinDenied::Blocked)
    );
    assert!(resumed.is_ok());
}

#[test]
fn leaderboard__profit_matches_balance_movement() {
    // given
    let mut ctx = TestContext::with_seed(3);
    let (alice, bob) = (ctx.alice(), ctx.bob());
    for _ in 0..8 {
        ctx.machine().spin(&alice).unwrap();
        ctx.machine().spin(&bob).unwrap();
    }
    ctx.machine().spin(&bob).unwrap();

    // when
    let board = leaderboard::leaderboard(ctx.storage(), SortBy::GamesPlayed, 10).unwrap();

    // then
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].user_id, bob);
    assert_eq!(board[0].games_played, 9);
    assert_eq!(board[0].display_name, "bob@example.com");
    for standing in &board {
        let balance = ctx.backend().balance(&standing.user_id).unwrap().unwrap();
        assert!((standing.profit_loss - (balance - 100.0)).abs() < 1e-9);
    }
}
