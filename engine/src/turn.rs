//! Turn resolution: the operator-driven attack sequence run against an
//! [`Encounter`].
//!
//! Every procedure here takes the encounter and a [`Prompt`]. Leaving a
//! question with the exit token surfaces as [`TurnError::ExitToMenu`]; state
//! already applied (damage, log rows, initiative) stays applied.

use thiserror::Error;

use crate::checks::{
    calculate_earned_xp, resolve_to_hit, SaveEffect, SaveOutcome, ToHit, TO_HIT_DIE,
    TO_HIT_DIE_MINIMUM,
};
use crate::combatant::CombatSide;
use crate::encounter::{
    Encounter, INITIATIVE_ACTIVE_MAXIMUM, INITIATIVE_ACTIVE_MINIMUM, INITIATIVE_MAXIMUM,
    INITIATIVE_MINIMUM, INITIATIVE_NONE,
};
use crate::prompt::{ExitToMenu, Prompt, Reply};
use crate::saving_throw::SavingThrowCategory;
use crate::store::{CombatStore, StoreError};

pub const DAMAGE_MAXIMUM: i32 = 999;
pub const XP_ENTRY_MAXIMUM: i32 = 99_999;

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    ExitToMenu(#[from] ExitToMenu),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type TurnResult<T> = Result<T, TurnError>;

/// What the round loop should do after one pass of the attack sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStep {
    /// Nobody left at or below the cursor.
    RoundOver,
    /// Look for the next attacker straight away.
    Continue,
    /// An attacker's turn finished; offer to stop the round early.
    CheckContinue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    NextRound,
    NextEncounter,
    /// Operator stopped attacking mid-round; the next round is already prepared.
    EndedEarly,
    /// Round finished and the operator declined both another round and a new encounter.
    Stopped,
}

/// Start-of-round initiative. Returns whether initiative was (re)entered.
pub fn gather_initiative<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
) -> TurnResult<bool> {
    let roll = if encounter.round_number == 1 {
        prompt.ask_yes_no("Roll initiative?", true)?
    } else {
        prompt.ask_yes_no("Re-roll initiative?", false)?
    };
    if !roll {
        encounter.sort_by_initiative();
        return Ok(false);
    }

    prompt.announce("Enter Initiative:");
    let previous: Vec<(String, i32)> =
        encounter.combatants().iter().map(|c| (c.key().to_string(), c.initiative)).collect();

    for idx in 0..encounter.combatants().len() {
        let c = encounter.combatant(idx);
        if c.is_dungeon_master() {
            encounter.combatant_mut(idx).initiative = INITIATIVE_ACTIVE_MAXIMUM;
            continue;
        }
        if c.is_player_character() {
            prompt_combatant_initiative(encounter, prompt, idx)?;
            continue;
        }
        if c.initiative >= INITIATIVE_ACTIVE_MINIMUM {
            let choice = prompt.ask_text(&format!(
                "Re-roll {}'s {} initiative? (<Enter> to keep, A to auto-roll, M for manual entry)",
                c.key(),
                c.initiative
            ))?;
            match choice.as_str() {
                "" => continue,
                "M" => {
                    prompt_combatant_initiative(encounter, prompt, idx)?;
                    continue;
                }
                _ => {}
            }
        }
        let initiative = encounter.roll_nonplayer_initiative();
        let c = encounter.combatant_mut(idx);
        c.initiative = initiative;
        c.inactive_reason.clear();
        prompt.announce(&format!("{}'s initiative set to {}", c.key(), initiative));
    }

    encounter.check_duplicate_initiative();
    for (key, before) in previous {
        if let Some(idx) = encounter.find_combatant(&key) {
            encounter.log_initiative(idx, before)?;
        }
    }
    Ok(true)
}

/// Manual initiative entry for one combatant. Inactive-band values need
/// confirming and carry a reason.
pub fn prompt_combatant_initiative<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
    idx: usize,
) -> Reply<()> {
    let key = encounter.combatant(idx).key().to_string();
    let current = encounter.combatant(idx).initiative;
    let keep_question = format!("{key}'s initiative is {current}. Keep it?");
    if current > 0 && prompt.ask_yes_no(&keep_question, true)? {
        prompt.announce(&format!("Keeping previous initiative value of {current}"));
        return Ok(());
    }

    loop {
        let value = prompt.ask_number(
            &format!("{key}'s initiative?"),
            INITIATIVE_MINIMUM,
            INITIATIVE_MAXIMUM,
        )?;
        if value >= INITIATIVE_ACTIVE_MINIMUM {
            let c = encounter.combatant_mut(idx);
            c.initiative = value;
            c.inactive_reason.clear();
            return Ok(());
        }
        let confirm = format!("Initiative value {value} is for inactive combatants. Keep it?");
        if !prompt.ask_yes_no(&confirm, true)? {
            continue;
        }
        let previous = encounter.combatant(idx).inactive_reason.clone();
        let reason = loop {
            let question = if previous.is_empty() {
                "Reason for inactivity?".to_string()
            } else {
                format!("Reason for inactivity? (<Enter> to keep {previous})")
            };
            let reason = prompt.ask_text(&question)?;
            if !reason.is_empty() {
                break reason;
            }
            if !previous.is_empty() {
                break previous.clone();
            }
        };
        let c = encounter.combatant_mut(idx);
        c.initiative = value;
        c.inactive_reason = reason;
        return Ok(());
    }
}

/// Moves the encounter's cursor anywhere in the initiative range.
pub fn set_encounter_initiative<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
) -> Reply<()> {
    let current = encounter.initiative_cursor;
    if prompt.ask_yes_no(&format!("Keep current initiative {current}?"), true)? {
        return Ok(());
    }
    encounter.initiative_cursor =
        prompt.ask_number("Set initiative", INITIATIVE_MINIMUM, INITIATIVE_MAXIMUM)?;
    tracing::debug!(from = current, to = encounter.initiative_cursor, "encounter initiative set");
    Ok(())
}

/// One pass: pick the next attacker and let them act once.
pub fn process_attack_sequence<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
) -> TurnResult<AttackStep> {
    let Some(attacker) = encounter.find_next_attacker() else {
        encounter.initiative_cursor = INITIATIVE_NONE;
        return Ok(AttackStep::RoundOver);
    };

    prompt.announce(&encounter.format_encounter());
    prompt.announce(&encounter.format_combatants());
    if encounter.combatant(attacker).is_inactive() {
        return review_inactive_attacker(encounter, prompt, attacker);
    }

    let c = encounter.combatant(attacker);
    prompt.announce(&format!("{} turn: {} attack(s)/round", c.key(), c.sheet.attacks_per_round));
    prompt.announce(&format!(
        "{} Attack #{}",
        encounter.attack_type_label(),
        encounter.attack_number
    ));

    if prompt.ask_yes_no("Skip attack?", c.is_dungeon_master())? {
        prompt.announce("ATTACK SKIPPED");
        encounter.end_attacker_turn();
        return Ok(AttackStep::Continue);
    }

    prompt.announce("ATTACKING...");
    let special = encounter.combatant(attacker).format_special_attacks();
    if !special.is_empty() {
        prompt.announce(&special);
    }

    if prompt.ask_yes_no("Special attack?", false)? {
        process_attack_special(encounter, prompt, attacker)?;
    } else if !process_attack_regular(encounter, prompt, attacker)? {
        encounter.end_attacker_turn();
        return Ok(AttackStep::Continue);
    }

    if prompt.ask_yes_no("Attack again?", false)? {
        encounter.attack_number += 1;
        Ok(AttackStep::Continue)
    } else {
        encounter.end_attacker_turn();
        Ok(AttackStep::CheckContinue)
    }
}

fn review_inactive_attacker<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
    attacker: usize,
) -> TurnResult<AttackStep> {
    let c = encounter.combatant(attacker);
    let key = c.key().to_string();
    let before = c.initiative;
    let mut question = format!("{key} is currently inactive.");
    if !c.inactive_reason.is_empty() {
        question.push_str(&format!(" (last status: {})", c.inactive_reason));
    }
    question.push_str(" Should this change?");

    if prompt.ask_yes_no(&question, false)? {
        let status = prompt.ask_text(
            "Change initiative or inactive status? (<Enter> for initiative, or the new status)",
        )?;
        if status.is_empty() {
            prompt_combatant_initiative(encounter, prompt, attacker)?;
            encounter.check_duplicate_initiative();
            let Some(idx) = encounter.find_combatant(&key) else {
                return Ok(AttackStep::Continue);
            };
            encounter.log_initiative(idx, before)?;
            let initiative = encounter.combatant(idx).initiative;
            if initiative >= INITIATIVE_ACTIVE_MINIMUM {
                prompt.announce(&format!("{key} is active again at initiative {initiative}"));
                return Ok(AttackStep::CheckContinue);
            }
            prompt.announce(&format!("{key} will remain inactive"));
        } else {
            encounter.combatant_mut(attacker).inactive_reason = status;
        }
    }

    encounter.initiative_cursor = before - 1;
    Ok(AttackStep::Continue)
}

/// Picks the attacker's target, offering the remembered one first. `None`
/// when nobody but the attacker is left standing.
pub fn find_next_defender<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
    attacker: usize,
) -> Reply<Option<usize>> {
    let anyone_left =
        encounter.combatants().iter().enumerate().any(|(i, c)| i != attacker && c.is_alive());
    if !anyone_left {
        return Ok(None);
    }

    loop {
        let a = encounter.combatant(attacker);
        let attacker_key = a.key().to_string();
        let remembered = a.defender_key.clone();
        let question = match &remembered {
            Some(k) => format!(
                "Is {attacker_key} attacking {k}? (<Enter> to confirm, or a new typeabbrseq)"
            ),
            None => format!("Who is {attacker_key} attacking? (typeabbrseq)"),
        };
        let entered = prompt.ask_text(&question)?;
        let target = if entered.is_empty() {
            match remembered {
                Some(k) => k,
                None => {
                    prompt.announce("Please enter a defender typeabbrseq");
                    continue;
                }
            }
        } else {
            entered
        };

        if target.eq_ignore_ascii_case(&attacker_key) {
            prompt.announce(&format!("{attacker_key} cannot self-attack. Try again"));
            continue;
        }
        let Some(defender) = encounter.find_combatant(&target) else {
            prompt.announce(&format!("defender {target} does not exist. Try again"));
            encounter.combatant_mut(attacker).defender_key = None;
            continue;
        };

        let d = encounter.combatant(defender);
        let defender_key = d.key().to_string();
        let same_side =
            format!("{attacker_key} and {defender_key} are on the same side. Are you sure?");
        if d.side == encounter.combatant(attacker).side && !prompt.ask_yes_no(&same_side, false)? {
            encounter.combatant_mut(attacker).defender_key = None;
            continue;
        }
        if !encounter.combatant(defender).is_alive() {
            prompt.announce(&format!("{defender_key} is dead"));
            encounter.combatant_mut(attacker).defender_key = None;
            continue;
        }

        encounter.combatant_mut(attacker).defender_key = Some(defender_key);
        return Ok(Some(defender));
    }
}

/// Player characters always enter their roll; everyone else may auto-roll.
pub fn get_to_hit_roll<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
    attacker: usize,
) -> Reply<i32> {
    let auto = !encounter.combatant(attacker).is_player_character()
        && prompt.ask_yes_no(&format!("Roll 'To Hit' d{TO_HIT_DIE} automatically?"), true)?;
    let roll = if auto {
        encounter.dice_mut().d20()
    } else {
        prompt.ask_number(
            &format!("Enter 'To Hit' d{TO_HIT_DIE} result"),
            TO_HIT_DIE_MINIMUM,
            TO_HIT_DIE,
        )?
    };
    prompt.announce(&format!("ROLLED {roll}"));
    Ok(roll)
}

/// A weapon attack against one defender. Returns `false` when there was
/// nobody to attack.
pub fn process_attack_regular<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
    attacker: usize,
) -> TurnResult<bool> {
    let Some(defender) = find_next_defender(encounter, prompt, attacker)? else {
        prompt.announce("No defender available");
        return Ok(false);
    };

    let roll = get_to_hit_roll(encounter, prompt, attacker)?;
    let outcome =
        resolve_to_hit(roll, encounter.combatant(attacker), encounter.combatant(defender));
    tracing::debug!(
        attacker = encounter.combatant(attacker).key(),
        defender = encounter.combatant(defender).key(),
        roll,
        ?outcome,
        "to-hit resolved"
    );
    let attack_type = encounter.attack_type_label();

    if outcome.is_hit() {
        let d = encounter.combatant(defender);
        let defense = d.format_special_defense();
        if !defense.is_empty() {
            prompt.announce(&defense);
        }
        let per_attack = encounter.combatant(attacker).format_damage_per_attack();
        if !per_attack.is_empty() {
            prompt.announce(&per_attack);
        }

        let message = format!("{attack_type} {}", outcome.label());
        let damage = prompt.ask_number(&format!("Enter {message} damage"), 0, DAMAGE_MAXIMUM)?;
        let d = encounter.combatant(defender);
        let xp_total = d.experience_value;
        let xp_earned = calculate_earned_xp(d.max_hp(), d.hp(), damage, xp_total);
        encounter.apply_damage(attacker, defender, damage, xp_total, xp_earned, &message)?;

        let d = encounter.combatant(defender);
        prompt.announce(&format!(
            "{message} {} for {damage} points damage ({} remaining)",
            d.key(),
            d.hp()
        ));
        encounter.note_defeat(attacker, defender);
        return Ok(true);
    }

    let message = format!("{attack_type} missed");
    encounter.log_miss(attacker, defender, &message)?;
    prompt.announce(&format!("{message} {}", encounter.combatant(defender).key()));
    if outcome != ToHit::Fumble || !prompt.ask_yes_no("Is attack fumbled/cursed?", false)? {
        return Ok(true);
    }

    let a = encounter.combatant(attacker);
    let attacker_key = a.key().to_string();
    let is_friend = a.side == CombatSide::Friend;
    let damage =
        prompt.ask_number(&format!("Enter {attacker_key} fumble damage"), 0, DAMAGE_MAXIMUM)?;
    let penalty_xp = if is_friend {
        prompt.ask_number("Enter penalty xp (-number)", -XP_ENTRY_MAXIMUM, 0)?
    } else {
        0
    };
    let was_alive = encounter.combatant(attacker).is_alive();
    let note = format!("{attack_type} fumbled/cursed damage");
    encounter.apply_damage(attacker, attacker, damage, 0, penalty_xp, &note)?;
    prompt.announce(&format!(
        "{attacker_key} takes {damage} points damage ({} remaining)",
        encounter.combatant(attacker).hp()
    ));
    if was_alive {
        encounter.note_defeat(attacker, attacker);
    }
    Ok(true)
}

/// Resolves a comma-separated target list. `#GROUP` entries pull in every
/// living member of that group; unknown keys are re-asked or dropped. The
/// attacker never ends up in its own list. Roster order, no duplicates.
pub fn get_defenders<S: CombatStore, P: Prompt>(
    encounter: &Encounter<S>,
    prompt: &mut P,
    attacker: usize,
) -> Reply<Vec<usize>> {
    let raw = loop {
        let raw = prompt.ask_text("Enter comma-delimited defenders by typeabbrseq and/or #group")?;
        if !raw.is_empty() {
            break raw;
        }
        prompt.announce("No defenders entered. Try again!");
    };

    let mut wanted: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if item.starts_with('#') || encounter.is_combatant(item) {
            wanted.push(item.to_string());
            continue;
        }
        loop {
            let replacement = prompt.ask_text(&format!(
                "defender '{item}' is not in the combatant list. \
                 Re-enter typeabbrseq or <Enter> to ignore"
            ))?;
            if replacement.is_empty() {
                break;
            }
            if replacement.starts_with('#') || encounter.is_combatant(&replacement) {
                wanted.push(replacement);
                break;
            }
        }
    }

    let groups: Vec<&str> = wanted.iter().filter_map(|w| w.strip_prefix('#')).collect();
    Ok(encounter
        .combatants()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != attacker)
        .filter(|(_, c)| {
            let named = wanted.iter().any(|w| w.eq_ignore_ascii_case(c.key()));
            let grouped = c.is_alive()
                && c.groups().any(|g| groups.iter().any(|w| w.eq_ignore_ascii_case(g)));
            named || grouped
        })
        .map(|(i, _)| i)
        .collect())
}

/// Spell-like attack against several defenders, each optionally saving.
pub fn process_attack_special<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
    attacker: usize,
) -> TurnResult<()> {
    let name = prompt.ask_text("Enter special attack name")?;

    let defenders = loop {
        let defenders = get_defenders(encounter, prompt, attacker)?;
        if defenders.is_empty() {
            prompt.announce("No defenders found. Try again!");
            continue;
        }
        let listing: Vec<&str> = defenders.iter().map(|&d| encounter.combatant(d).key()).collect();
        let question = format!(
            "defender list:\n    {}\nIs this defender list correct?",
            listing.join("\n    ")
        );
        if prompt.ask_yes_no(&question, true)? {
            break defenders;
        }
    };

    let save = if prompt.ask_yes_no("Is saving throw allowed?", true)? {
        let halves = prompt.ask_yes_no(
            "If the save is made, does the defender take 50% damage? (No for none)",
            false,
        )?;
        let effect = if halves {
            SaveEffect::Halves
        } else {
            SaveEffect::Negates
        };
        let menu: Vec<String> = SavingThrowCategory::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}: {c}", i + 1))
            .collect();
        prompt.announce(&format!("Saving Throw Type:\n{}", menu.join("\n")));
        let choice = prompt.ask_number(
            "Select saving throw type",
            1,
            SavingThrowCategory::ALL.len() as i32,
        )?;
        Some((SavingThrowCategory::ALL[(choice - 1) as usize], effect))
    } else {
        None
    };

    let per_defender =
        defenders.len() > 1 && prompt.ask_yes_no("Enter damage for each defender?", false)?;
    let attacker_side = encounter.combatant(attacker).side;
    let attacker_key = encounter.combatant(attacker).key().to_string();
    let mut shared_damage = None;

    for &defender in &defenders {
        let d = encounter.combatant(defender);
        let defender_key = d.key().to_string();
        prompt.announce(&format!("Defender: {defender_key}"));

        let outcome = match save {
            None => SaveOutcome::NotAllowed,
            Some((category, effect)) => {
                let needed = match d.saving_throw_needed(encounter.saving_throws(), category) {
                    Some(needed) => needed,
                    None => prompt.ask_number(
                        &format!(
                            "No saving throw row for {defender_key}. Roll needed vs. {category}?"
                        ),
                        TO_HIT_DIE_MINIMUM,
                        TO_HIT_DIE,
                    )?,
                };
                let roll = if encounter.combatant(defender).is_player_character() {
                    prompt.ask_number(
                        &format!("Enter {defender_key}'s save vs. {category} ({needed} needed)"),
                        TO_HIT_DIE_MINIMUM,
                        TO_HIT_DIE,
                    )?
                } else {
                    encounter.dice_mut().d20()
                };
                SaveOutcome::resolve(roll, needed, effect)
            }
        };

        let base = match shared_damage {
            Some(base) if !per_defender => base,
            _ => {
                let base = prompt.ask_number(
                    "Enter special attack damage (+/-number)",
                    -DAMAGE_MAXIMUM,
                    DAMAGE_MAXIMUM,
                )?;
                shared_damage = Some(base);
                base
            }
        };
        let damage = outcome.apply(base);

        let mut message = format!("{} special attack: '{name}'", encounter.attack_type_label());
        let summary = match outcome {
            SaveOutcome::NotAllowed => format!("{damage}"),
            SaveOutcome::Failed { roll, needed } => {
                message.push_str(&format!(" (Save FAIL: {roll} < {needed}) Full damage taken"));
                format!("Saving throw failed (rolled {roll} needed {needed}) Full damage {damage}")
            }
            SaveOutcome::Made { roll, needed, effect: SaveEffect::Halves } => {
                message.push_str(&format!(" (Save GOOD: {roll} >= {needed}) Half damage taken"));
                format!("Saving throw made (rolled {roll} needed {needed}) Half damage {damage}")
            }
            SaveOutcome::Made { roll, needed, effect: SaveEffect::Negates } => {
                message.push_str(&format!(" (Save GOOD: {roll} >= {needed})"));
                format!("Saving throw made (rolled {roll} needed {needed})")
            }
        };

        let d = encounter.combatant(defender);
        let xp_total = d.experience_value;
        let xp_base = if attacker_side == CombatSide::Friend && d.side == CombatSide::Friend {
            prompt.ask_number(
                &format!("Enter {attacker_key} xp"),
                -XP_ENTRY_MAXIMUM,
                XP_ENTRY_MAXIMUM,
            )?
        } else {
            calculate_earned_xp(d.max_hp(), d.hp(), damage, xp_total)
        };
        let xp_earned = outcome.apply(xp_base);

        let was_alive = encounter.combatant(defender).is_alive();
        encounter.apply_damage(attacker, defender, damage, xp_total, xp_earned, &message)?;
        prompt.announce(&format!(
            "{summary} points damage ({} remaining)",
            encounter.combatant(defender).hp()
        ));
        if was_alive {
            encounter.note_defeat(attacker, defender);
        }
    }
    Ok(())
}

/// Runs one round from initiative to its end.
pub fn run_round<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
) -> TurnResult<RoundOutcome> {
    prompt.announce(&encounter.format_encounter());
    prompt.announce(&encounter.format_combatants());
    gather_initiative(encounter, prompt)?;
    prompt.announce(&encounter.format_encounter());
    prompt.announce(&encounter.format_combatants());
    encounter.attack_number = 1;
    encounter.is_missile_phase =
        prompt.ask_yes_no("Is this a missile round? (No for melee)", true)?;

    while encounter.initiative_cursor > INITIATIVE_NONE {
        encounter.count_available_combatants();
        if encounter.foe_count == 0
            && !prompt.ask_yes_no(
                &format!(
                    "Encounter: {} Round: {} has no FOES. Continue?",
                    encounter.encounter_number, encounter.round_number
                ),
                false,
            )?
        {
            encounter.delete_defeated_foes()?;
            prompt.announce(&format!(
                "Encounter: {} Round: {} END",
                encounter.encounter_number, encounter.round_number
            ));
            prompt.announce(&encounter.format_combatants());
            encounter.prepare_next_encounter()?;
            prompt.announce(&encounter.format_encounter());
            return Ok(RoundOutcome::NextEncounter);
        }

        let step = process_attack_sequence(encounter, prompt)?;
        if step == AttackStep::RoundOver || encounter.initiative_cursor == INITIATIVE_NONE {
            break;
        }
        if step == AttackStep::CheckContinue && !prompt.ask_yes_no("Continue attacking?", true)? {
            encounter.delete_defeated_foes()?;
            prompt.announce(&format!("Round {} ENDED EARLY", encounter.round_number));
            encounter.prepare_next_round(false)?;
            prompt.announce(&encounter.format_encounter());
            return Ok(RoundOutcome::EndedEarly);
        }
    }

    encounter.delete_defeated_foes()?;
    prompt.announce(&format!("Round {} END", encounter.round_number));
    if prompt.ask_yes_no("Begin next round?", true)? {
        encounter.prepare_next_round(false)?;
        return Ok(RoundOutcome::NextRound);
    }
    if prompt.ask_yes_no("Begin next encounter?", true)? {
        encounter.prepare_next_encounter()?;
        prompt.announce(&encounter.format_encounter());
        return Ok(RoundOutcome::NextEncounter);
    }
    Ok(RoundOutcome::Stopped)
}

/// Keeps running rounds until the operator stops or a new encounter begins.
pub fn process_rounds<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
) -> TurnResult<RoundOutcome> {
    loop {
        match run_round(encounter, prompt)? {
            RoundOutcome::NextRound => continue,
            other => return Ok(other),
        }
    }
}
