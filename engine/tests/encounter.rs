use melee_engine::combatant::Regeneration;
use melee_engine::encounter::{EncounterError, INITIATIVE_ACTIVE_MAXIMUM};
use melee_engine::testing::{row, sheet, MemoryStore};
use melee_engine::{
    CharacterType, CombatSide, CombatStore, Dice, Encounter, HitDice, HitDiceFormula, RosterRow,
};

fn duel() -> Encounter<MemoryStore> {
    let store = MemoryStore::new(
        vec![row(CombatSide::Friend, "ALIEL", 1), row(CombatSide::Foe, "ANTG", 1)],
        vec![
            sheet("ALIEL", CharacterType::PlayerCharacter, 2, 18, 10),
            sheet("ANTG", CharacterType::Monster, 6, 16, 8),
        ],
        Vec::new(),
    );
    Encounter::new(store, Dice::from_seed(5)).unwrap()
}

fn set_initiative(enc: &mut Encounter<MemoryStore>, key: &str, initiative: i32) {
    let idx = enc.find_combatant(key).unwrap();
    enc.combatant_mut(idx).initiative = initiative;
}

fn wounded(side: CombatSide, abbr: &str, seq: u32, hp_max: i32, hp: i32) -> RosterRow {
    RosterRow { hp_max, hp, ..row(side, abbr, seq) }
}

#[test]
fn friend_with_higher_initiative_attacks_first() {
    let mut enc = duel();
    set_initiative(&mut enc, "AALIEL1", 6500);
    set_initiative(&mut enc, "OANTG1", 1200);
    enc.sort_by_initiative();
    enc.is_missile_phase = false;

    assert_eq!(enc.initiative_cursor, INITIATIVE_ACTIVE_MAXIMUM);
    let first = enc.find_next_attacker().unwrap();
    assert_eq!(enc.combatant(first).key(), "AALIEL1");
    assert_eq!(enc.initiative_cursor, 6500);

    // the same attacker is found again until its turn ends
    assert_eq!(enc.find_next_attacker(), Some(first));
    enc.end_attacker_turn();
    let second = enc.find_next_attacker().unwrap();
    assert_eq!(enc.combatant(second).key(), "OANTG1");
    enc.end_attacker_turn();
    assert_eq!(enc.find_next_attacker(), None);
}

#[test]
fn duplicate_initiative_bumps_the_later_combatant() {
    let mut enc = duel();
    set_initiative(&mut enc, "AALIEL1", 4000);
    set_initiative(&mut enc, "OANTG1", 4000);

    assert!(enc.check_duplicate_initiative());
    let order: Vec<(&str, i32)> =
        enc.combatants().iter().map(|c| (c.key(), c.initiative)).collect();
    assert_eq!(order, vec![("OANTG1", 4001), ("AALIEL1", 4000)]);
    assert!(!enc.check_duplicate_initiative());
}

#[test]
fn duplicate_at_the_ceiling_steps_down() {
    let mut enc = duel();
    set_initiative(&mut enc, "AALIEL1", 6999);
    set_initiative(&mut enc, "OANTG1", 6999);

    assert!(enc.check_duplicate_initiative());
    let order: Vec<(&str, i32)> =
        enc.combatants().iter().map(|c| (c.key(), c.initiative)).collect();
    assert_eq!(order, vec![("AALIEL1", 6999), ("OANTG1", 6998)]);
}

#[test]
fn missile_phase_skips_melee_only_combatants() {
    let mut enc = duel();
    set_initiative(&mut enc, "AALIEL1", 6500);
    set_initiative(&mut enc, "OANTG1", 1200);
    enc.sort_by_initiative();
    let ant = enc.find_combatant("OANTG1").unwrap();
    enc.combatant_mut(ant).sheet.missile_attack = true;

    assert!(enc.is_missile_phase);
    assert_eq!(enc.find_next_attacker(), Some(ant));
    assert_eq!(enc.initiative_cursor, 1200);
}

#[test]
fn inactive_combatants_surface_without_moving_the_cursor() {
    let mut enc = duel();
    set_initiative(&mut enc, "AALIEL1", 500);
    enc.sort_by_initiative();
    enc.is_missile_phase = false;
    enc.initiative_cursor = 999;

    let idx = enc.find_next_attacker().unwrap();
    assert_eq!(enc.combatant(idx).key(), "AALIEL1");
    assert!(enc.combatant(idx).is_inactive());
    assert_eq!(enc.initiative_cursor, 999);
}

#[test]
fn unconscious_friends_stop_counting_but_unconscious_foes_do_not() {
    let store = MemoryStore::new(
        vec![
            wounded(CombatSide::Friend, "ALIEL", 1, 10, 0),
            row(CombatSide::Friend, "ERIC", 1),
            wounded(CombatSide::Foe, "BAND", 1, 10, -3),
            wounded(CombatSide::Foe, "ANTG", 1, 8, 0),
        ],
        vec![
            sheet("ALIEL", CharacterType::PlayerCharacter, 2, 18, 10),
            sheet("ERIC", CharacterType::NonPlayerCharacter, 3, 17, 20),
            sheet("BAND", CharacterType::NonPlayerCharacter, 7, 19, 10),
            sheet("ANTG", CharacterType::Monster, 3, 16, 8),
        ],
        Vec::new(),
    );
    let enc = Encounter::new(store, Dice::from_seed(1)).unwrap();
    assert_eq!(enc.friend_count, 1);
    assert_eq!(enc.foe_count, 1);
}

#[test]
fn next_round_and_next_encounter_reset_counters() {
    let mut enc = duel();
    enc.initiative_cursor = 1234;
    enc.attack_number = 3;

    enc.prepare_next_round(false).unwrap();
    assert_eq!(enc.round_number, 2);
    assert_eq!(enc.initiative_cursor, INITIATIVE_ACTIVE_MAXIMUM);
    assert_eq!(enc.attack_number, 1);

    enc.prepare_next_round(false).unwrap();
    enc.prepare_next_encounter().unwrap();
    assert_eq!(enc.encounter_number, 2);
    assert_eq!(enc.round_number, 1);
}

#[test]
fn regeneration_waits_for_its_delay_then_logs_each_gain() {
    let mut troll = sheet("TROLL", CharacterType::Monster, 4, 13, 20);
    troll.regeneration = Regeneration { round_start: 2, hit_points: 3, after_damage: true };
    let store = MemoryStore::new(
        vec![wounded(CombatSide::Foe, "TROLL", 1, 20, 10)],
        vec![troll],
        Vec::new(),
    );
    let mut enc = Encounter::new(store, Dice::from_seed(1)).unwrap();

    enc.prepare_next_round(false).unwrap();
    assert_eq!(enc.combatant(0).hp(), 10);
    assert!(enc.store().log.is_empty());

    enc.prepare_next_round(false).unwrap();
    assert_eq!(enc.combatant(0).hp(), 13);
    let log = &enc.store().log;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].note, "regeneration BEFORE");
    assert_eq!((log[0].defender_hp, log[0].damage), (10, -3));
    assert_eq!((log[1].defender_hp, log[1].damage), (13, 0));
    assert_eq!(enc.store().roster[0].hp, 13);

    for _ in 0..3 {
        enc.prepare_next_round(false).unwrap();
    }
    assert_eq!(enc.combatant(0).hp(), 20);
    // healed up: the delay starts over on the next wound
    assert_eq!(enc.combatant(0).regeneration_counter, 0);
}

#[test]
fn immediate_regeneration_applies_every_round_while_wounded() {
    let mut slime = sheet("SLIME", CharacterType::Monster, 8, 19, 12);
    slime.regeneration = Regeneration { round_start: 0, hit_points: 5, after_damage: false };
    let store = MemoryStore::new(
        vec![wounded(CombatSide::Foe, "SLIME", 1, 12, 1)],
        vec![slime],
        Vec::new(),
    );
    let mut enc = Encounter::new(store, Dice::from_seed(1)).unwrap();

    enc.prepare_next_round(false).unwrap();
    assert_eq!(enc.combatant(0).hp(), 6);
    enc.prepare_next_round(false).unwrap();
    enc.prepare_next_round(false).unwrap();
    assert_eq!(enc.combatant(0).hp(), 12);
    assert_eq!(enc.store().log.len(), 6);
}

#[test]
fn defeated_foes_leave_memory_and_store_but_friends_stay() {
    let store = MemoryStore::new(
        vec![
            wounded(CombatSide::Friend, "ALIEL", 1, 10, 0),
            wounded(CombatSide::Foe, "ANTG", 1, 8, 0),
            row(CombatSide::Foe, "ANTG", 2),
        ],
        vec![
            sheet("ALIEL", CharacterType::PlayerCharacter, 2, 18, 10),
            sheet("ANTG", CharacterType::Monster, 3, 16, 8),
        ],
        Vec::new(),
    );
    let mut enc = Encounter::new(store, Dice::from_seed(1)).unwrap();

    assert_eq!(enc.delete_defeated_foes().unwrap(), 1);
    assert!(!enc.is_combatant("OANTG1"));
    assert!(enc.is_combatant("AALIEL1"));
    assert!(enc.store().roster_row(CombatSide::Foe, "ANTG", 1).is_none());
    assert_eq!(enc.store().roster.len(), 2);
}

#[test]
fn rolled_hit_points_are_written_back() {
    let mut ant = sheet("ANTG", CharacterType::Monster, 3, 16, 0);
    ant.hit_dice =
        HitDice { formula: HitDiceFormula::DieFixed, dice: 2, die: 8, ..Default::default() };
    let store = MemoryStore::new(vec![row(CombatSide::Foe, "ANTG", 1)], vec![ant], Vec::new());
    let enc = Encounter::new(store, Dice::from_scripted(vec![3, 5])).unwrap();

    assert_eq!(enc.combatant(0).max_hp(), 8);
    let persisted = enc.store().roster_row(CombatSide::Foe, "ANTG", 1).unwrap();
    assert_eq!((persisted.hp_max, persisted.hp), (8, 8));
}

#[test]
fn reload_keeps_live_state_for_surviving_keys() {
    let mut enc = duel();
    set_initiative(&mut enc, "AALIEL1", 3100);
    let ant = enc.find_combatant("OANTG1").unwrap();
    enc.combatant_mut(ant).initiative = 700;
    enc.combatant_mut(ant).inactive_reason = "FLEEING".to_string();

    let store = enc.store_mut();
    store.sheets.push(sheet("ERIC", CharacterType::NonPlayerCharacter, 3, 17, 20));
    store.roster.push(row(CombatSide::Friend, "ERIC", 1));
    store.roster.iter_mut().find(|r| r.abbr == "ALIEL").unwrap().is_active = false;

    assert_eq!(enc.load_combatants().unwrap(), 2);
    assert!(!enc.is_combatant("AALIEL1"));
    let ant = enc.combatant(enc.find_combatant("OANTG1").unwrap());
    assert_eq!((ant.initiative, ant.inactive_reason.as_str()), (700, "FLEEING"));
    let eric = enc.combatant(enc.find_combatant("AERIC1").unwrap());
    assert_eq!(eric.initiative, 0);
}

#[test]
fn roster_errors_fail_fast() {
    let store = MemoryStore::new(
        vec![row(CombatSide::Foe, "ANTG", 1), row(CombatSide::Foe, "ANTG", 1)],
        vec![sheet("ANTG", CharacterType::Monster, 3, 16, 8)],
        Vec::new(),
    );
    let err = Encounter::new(store, Dice::from_seed(1)).err().unwrap();
    assert!(matches!(err, EncounterError::DuplicateCombatant(ref key) if key == "OANTG1"));

    let store = MemoryStore::new(vec![row(CombatSide::Foe, "ORC", 1)], Vec::new(), Vec::new());
    let err = Encounter::new(store, Dice::from_seed(1)).err().unwrap();
    assert!(matches!(err, EncounterError::MissingSheet { ref abbr, .. } if abbr == "ORC"));
}

#[test]
fn initiative_changes_are_logged_in_pairs() {
    let mut enc = duel();
    let idx = enc.find_combatant("AALIEL1").unwrap();
    enc.combatant_mut(idx).initiative = 4200;
    enc.log_initiative(idx, 0).unwrap();

    let log = &enc.store_mut().log;
    assert_eq!(log.len(), 2);
    assert_eq!((log[0].attacker.initiative, log[0].note.as_str()), (0, "initiative BEFORE"));
    assert_eq!((log[1].attacker.initiative, log[1].note.as_str()), (4200, "initiative AFTER"));
    assert!(log.iter().all(|r| r.defender.is_none()));
}

#[test]
fn status_text_formats() {
    let mut enc = duel();
    set_initiative(&mut enc, "AALIEL1", 6500);
    set_initiative(&mut enc, "OANTG1", 1200);
    enc.sort_by_initiative();

    insta::assert_snapshot!(
        enc.format_encounter(),
        @"Encounter: 1 | Round: 1 | Initiative: 6999 | Missile"
    );
    insta::assert_snapshot!(enc.format_combatants(), @r"
    Combatant    Side   Type  Init        HP   AC Group    Status
    AALIEL1      FRIEND PC    6500     10/10    2 A0       ACTIVE
    OANTG1       FOE    M     1200       8/8    6 O0       ACTIVE
    ");
}

#[test]
fn memory_store_loads_only_active_rows() {
    let mut store = MemoryStore::new(
        vec![
            row(CombatSide::Foe, "ANTG", 1),
            RosterRow { is_active: false, ..row(CombatSide::Foe, "ANTG", 2) },
        ],
        vec![sheet("ANTG", CharacterType::Monster, 3, 16, 8)],
        Vec::new(),
    );
    assert_eq!(store.load_roster_rows().unwrap().len(), 1);
}
