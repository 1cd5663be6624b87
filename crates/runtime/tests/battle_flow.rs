//! End-to-end battles driven through the runtime handles.

use std::time::Duration;

use combat_core::{
    ActionType, BattleError, BattleId, BattleStatus, BattleType, CharacterId, CombatAction,
    CombatAttributes, CombatEvent, CombatStyle, Position,
};
use combat_runtime::{
    ActionLogRepository, BattleHandle, CharacterStore, Event, InMemoryActionLog, Runtime,
    RuntimeError, RuntimeHandle, Topic,
};
use tokio::sync::broadcast;
use tokio::time::timeout;

const A: CharacterId = CharacterId(1);
const B: CharacterId = CharacterId(2);
const C: CharacterId = CharacterId(3);

/// A hits for 39 with taijutsu and for 999 with a weapon; B has defaults.
fn duelists() -> CharacterStore {
    let store = CharacterStore::new();
    store
        .insert(
            A,
            CombatAttributes {
                taijutsu: 1000,
                speed: 40,
                bukijutsu: 1000,
                strength: 1000,
                ..CombatAttributes::default()
            },
        )
        .unwrap();
    store.insert(B, CombatAttributes::default()).unwrap();
    store
}

async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event should arrive in time")
        .expect("event bus should stay open")
}

#[tokio::test]
async fn duel_runs_to_completion() {
    let characters = duelists();
    let action_log = InMemoryActionLog::new("duel");
    let runtime = Runtime::builder()
        .characters(characters.clone())
        .action_log(action_log.clone())
        .turn_timeout(None)
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();

    let mut lifecycle = handle.subscribe(Topic::Lifecycle);
    let mut combat = handle.subscribe(Topic::Combat);

    // ===== preparing =====
    let battle = handle
        .create_battle(BattleType::PvP, None)
        .expect("battle should be created");
    assert!(matches!(
        next_event(&mut lifecycle).await,
        Event::BattleCreated { battle_type: BattleType::PvP, .. }
    ));

    battle.join(A, Some(Position::new(0, 0))).await.unwrap();
    battle.join(B, Some(Position::new(0, 3))).await.unwrap();
    assert_eq!(handle.battle_of(A).unwrap(), Some(battle.id()));

    let order = battle.start().await.unwrap();
    assert_eq!(order, vec![A, B]);

    // ===== combat =====
    let outcome = battle
        .submit_action(CombatAction::attack(A, B, CombatStyle::Taijutsu, 10))
        .await
        .unwrap();
    assert_eq!(outcome.result.damage_dealt, 39);
    assert_eq!(characters.get(B).unwrap().unwrap().hp, 61);

    let resolved = next_event(&mut combat).await;
    assert!(matches!(
        resolved,
        Event::ActionResolved { ref result, .. } if result.sequence == 0
    ));
    assert!(matches!(
        next_event(&mut combat).await,
        Event::Battle(ref event)
            if matches!(event.event, CombatEvent::DamageDealt { amount: 39, remaining_hp: 61, .. })
    ));

    battle
        .submit_action(CombatAction::jutsu(A, B, CombatStyle::Taijutsu, 20, 10, 5))
        .await
        .unwrap();
    let attacker = characters.get(A).unwrap().unwrap();
    assert_eq!((attacker.cp, attacker.sp), (90, 95));
    assert_eq!(characters.get(B).unwrap().unwrap().hp, 22);

    let outcome = battle
        .submit_action(CombatAction::weapon(A, B, 10))
        .await
        .unwrap();
    assert!(outcome.events.iter().any(CombatEvent::is_battle_end));

    // ===== finished =====
    let snapshot = battle.snapshot().await.unwrap();
    assert_eq!(snapshot.status(), BattleStatus::Finished);
    assert_eq!(snapshot.winner(), Some(A));
    assert_eq!(snapshot.participant(A).unwrap().current_ap(), 60);
    assert_eq!(characters.get(B).unwrap().unwrap().hp, 0);
    assert_eq!(handle.battle_of(A).unwrap(), None);
    assert_eq!(handle.battle_of(B).unwrap(), None);

    let mut ended = None;
    while ended.is_none() {
        if let Event::Battle(event) = next_event(&mut lifecycle).await {
            if let CombatEvent::BattleEnded { winner, reward } = event.event {
                ended = Some((winner, reward));
            }
        }
    }
    let (winner, reward) = ended.unwrap();
    assert_eq!(winner, Some(A));
    assert_eq!(reward.unwrap().experience, 200);

    // ===== persistence =====
    assert_eq!(runtime.flush_action_log().await.unwrap(), 3);
    let records = action_log.read_all().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(
        records.iter().map(|r| r.action_type).collect::<Vec<_>>(),
        vec![ActionType::Attack, ActionType::Jutsu, ActionType::Weapon]
    );
    assert_eq!((records[1].cp_cost, records[1].sp_cost), (10, 5));
    assert_eq!(records[2].damage_dealt, 999);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn character_fights_in_one_unfinished_battle_at_a_time() {
    let runtime = Runtime::builder()
        .characters(duelists())
        .turn_timeout(None)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    let first = handle.create_battle(BattleType::PvP, None).unwrap();
    let second = handle.create_battle(BattleType::PvP, None).unwrap();
    assert_ne!(first.id(), second.id());

    first.join(A, None).await.unwrap();
    first.join(B, None).await.unwrap();

    let rejected = second.join(A, None).await;
    assert!(matches!(
        rejected,
        Err(RuntimeError::AlreadyInBattle { character: A, battle }) if battle == first.id()
    ));
    assert!(second.snapshot().await.unwrap().participants().is_empty());

    first.start().await.unwrap();
    first
        .submit_action(CombatAction::weapon(A, B, 10))
        .await
        .unwrap();

    let participant = second.join(A, None).await.unwrap();
    assert_eq!(participant.character_id(), A);
    assert_eq!(handle.battle_of(A).unwrap(), Some(second.id()));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn failed_join_does_not_claim_the_character() {
    let runtime = Runtime::builder()
        .characters(duelists())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let battle = handle.create_battle(BattleType::PvE, None).unwrap();

    assert!(matches!(
        battle.join(C, None).await,
        Err(RuntimeError::Battle(BattleError::UnknownCharacter(C)))
    ));
    assert_eq!(handle.battle_of(C).unwrap(), None);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_actions_are_published_and_change_nothing() {
    let runtime = Runtime::builder()
        .characters(duelists())
        .turn_timeout(None)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut combat = handle.subscribe(Topic::Combat);

    let battle = handle.create_battle(BattleType::PvP, None).unwrap();
    battle.join(A, Some(Position::new(0, 0))).await.unwrap();
    battle.join(B, Some(Position::new(0, 3))).await.unwrap();

    let early = battle
        .submit_action(CombatAction::attack(A, B, CombatStyle::Taijutsu, 10))
        .await;
    assert!(matches!(
        early,
        Err(RuntimeError::Battle(BattleError::InvalidState {
            status: BattleStatus::Preparing
        }))
    ));
    assert!(matches!(
        next_event(&mut combat).await,
        Event::ActionRejected { error: BattleError::InvalidState { .. }, .. }
    ));

    battle.start().await.unwrap();
    battle.pause().await.unwrap();
    let paused = battle
        .submit_action(CombatAction::movement(A, Position::new(0, 1), 1))
        .await;
    assert!(matches!(
        paused,
        Err(RuntimeError::Battle(BattleError::InvalidState {
            status: BattleStatus::Paused
        }))
    ));

    battle.resume().await.unwrap();
    battle
        .submit_action(CombatAction::movement(A, Position::new(0, 1), 1))
        .await
        .unwrap();

    let snapshot = battle.snapshot().await.unwrap();
    assert_eq!(snapshot.participant(A).unwrap().position(), Position::new(0, 1));
    assert_eq!(snapshot.participant(A).unwrap().current_ap(), 99);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_battles_are_reported() {
    let runtime = Runtime::builder()
        .characters(CharacterStore::new())
        .build()
        .await
        .unwrap();

    assert!(matches!(
        runtime.handle().battle(BattleId(99)),
        Err(RuntimeError::UnknownBattle(BattleId(99)))
    ));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn ready_round_restores_everyones_ap() {
    let runtime = Runtime::builder()
        .characters(duelists())
        .turn_timeout(None)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut turns = handle.subscribe(Topic::Turn);

    let battle = handle.create_battle(BattleType::PvP, None).unwrap();
    battle.join(A, Some(Position::new(0, 0))).await.unwrap();
    battle.join(B, Some(Position::new(0, 3))).await.unwrap();
    battle.start().await.unwrap();

    battle
        .submit_action(CombatAction::movement(A, Position::new(4, 5), 9))
        .await
        .unwrap();
    battle
        .submit_action(CombatAction::movement(B, Position::new(2, 3), 2))
        .await
        .unwrap();

    assert_eq!(
        battle.ready(A).await.unwrap(),
        vec![CombatEvent::ParticipantReady { character: A }]
    );
    assert_eq!(
        battle.ready(B).await.unwrap(),
        vec![
            CombatEvent::ParticipantReady { character: B },
            CombatEvent::RoundReset
        ]
    );

    let snapshot = battle.snapshot().await.unwrap();
    for participant in snapshot.participants() {
        assert_eq!(participant.current_ap(), 100);
        assert!(!participant.is_ready());
    }

    let mut seen = Vec::new();
    for _ in 0..3 {
        if let Event::Battle(event) = next_event(&mut turns).await {
            seen.push(event.event);
        }
    }
    assert_eq!(seen.last(), Some(&CombatEvent::RoundReset));

    runtime.shutdown().await.unwrap();
}

/// Joins A and B, starts, and lets A finish B with one weapon strike.
async fn fight_to_finish(handle: &RuntimeHandle) -> BattleHandle {
    handle.characters().set_hp(B, 100).unwrap();
    let battle = handle.create_battle(BattleType::PvP, None).unwrap();
    battle.join(A, Some(Position::new(0, 0))).await.unwrap();
    battle.join(B, Some(Position::new(0, 3))).await.unwrap();
    battle.start().await.unwrap();
    battle
        .submit_action(CombatAction::weapon(A, B, 10))
        .await
        .unwrap();
    battle
}

#[tokio::test]
async fn finished_battles_are_retired() {
    let runtime = Runtime::builder()
        .characters(duelists())
        .turn_timeout(None)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    let mut finished = Vec::new();
    for _ in 0..3 {
        finished.push(fight_to_finish(&handle).await);
    }

    assert!(handle.battle_ids().unwrap().is_empty());
    for battle in &finished {
        assert!(matches!(
            handle.battle(battle.id()),
            Err(RuntimeError::UnknownBattle(id)) if id == battle.id()
        ));
        // handles held by callers still see the final state
        let snapshot = battle.snapshot().await.unwrap();
        assert_eq!(snapshot.status(), BattleStatus::Finished);
        assert_eq!(snapshot.winner(), Some(A));
    }

    let running = handle.create_battle(BattleType::PvP, None).unwrap();
    assert_eq!(handle.battle_ids().unwrap(), vec![running.id()]);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn joining_a_finished_battle_reports_it_ended() {
    let runtime = Runtime::builder()
        .characters(duelists())
        .turn_timeout(None)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    let finished = fight_to_finish(&handle).await;
    let next = handle.create_battle(BattleType::PvP, None).unwrap();
    next.join(A, None).await.unwrap();

    assert!(matches!(
        finished.join(A, None).await,
        Err(RuntimeError::Battle(BattleError::BattleAlreadyEnded))
    ));
    assert_eq!(handle.battle_of(A).unwrap(), Some(next.id()));

    runtime.shutdown().await.unwrap();
}
