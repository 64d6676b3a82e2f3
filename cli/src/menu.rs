use melee_engine::turn::{self, TurnError};
use melee_engine::{CombatStore, Encounter, Prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    LoadSavingThrows,
    LoadCombatants,
    ListCombatants,
    NextEncounter,
    NextAttack,
    SetInitiative,
    CombatantInformation,
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 8] = [
        MenuAction::LoadSavingThrows,
        MenuAction::LoadCombatants,
        MenuAction::ListCombatants,
        MenuAction::NextEncounter,
        MenuAction::NextAttack,
        MenuAction::SetInitiative,
        MenuAction::CombatantInformation,
        MenuAction::Quit,
    ];

    pub fn code(self) -> i32 {
        match self {
            MenuAction::LoadSavingThrows => 0,
            MenuAction::LoadCombatants => 1,
            MenuAction::ListCombatants => 2,
            MenuAction::NextEncounter => 3,
            MenuAction::NextAttack => 4,
            MenuAction::SetInitiative => 5,
            MenuAction::CombatantInformation => 6,
            MenuAction::Quit => 99,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::LoadSavingThrows => "Load Saving Throws",
            MenuAction::LoadCombatants => "Load Combatants",
            MenuAction::ListCombatants => "List Combatants",
            MenuAction::NextEncounter => "Next Encounter",
            MenuAction::NextAttack => "Next Attack",
            MenuAction::SetInitiative => "Set Encounter Initiative",
            MenuAction::CombatantInformation => "List Combatant Information",
            MenuAction::Quit => "Quit",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }
}

fn menu_text() -> String {
    let mut text = String::from("\nActions:");
    for action in MenuAction::ALL {
        text.push_str(&format!("\n    {}: {}", action.code(), action.label()));
    }
    text
}

/// Reads and dispatches actions until Quit or the operator leaves the menu
/// prompt itself. Store failures end the session.
pub fn run_menu<S: CombatStore, P: Prompt>(
    encounter: &mut Encounter<S>,
    prompt: &mut P,
) -> anyhow::Result<()> {
    loop {
        prompt.announce(&menu_text());
        let Ok(code) = prompt.ask_number("Enter Action:", 0, MenuAction::Quit.code()) else {
            return Ok(());
        };
        let Some(action) = MenuAction::from_code(code) else {
            prompt.announce(&format!("*{code}* not a valid action"));
            continue;
        };
        if action == MenuAction::Quit {
            return Ok(());
        }
        match dispatch(action, encounter, prompt) {
            Ok(()) => {}
            Err(TurnError::ExitToMenu(_)) => prompt.announce("Returned to menu"),
            Err(TurnError::Store(e)) => return Err(e.into()),
        }
    }
}

fn dispatch<S: CombatStore, P: Prompt>(
    action: MenuAction,
    encounter: &mut Encounter<S>,
    prompt: &mut P,
) -> Result<(), TurnError> {
    match action {
        MenuAction::LoadSavingThrows => match encounter.load_saving_throws() {
            Ok(rows) => prompt.announce(&format!("{rows} saving throw rows loaded")),
            Err(e) => prompt.announce(&format!("Reload failed: {e}")),
        },
        MenuAction::LoadCombatants => match encounter.load_combatants() {
            Ok(count) => prompt.announce(&format!("{count} combatants loaded")),
            Err(e) => prompt.announce(&format!("Reload failed: {e}")),
        },
        _ if encounter.combatants().is_empty() => prompt.announce("No combatants loaded"),
        MenuAction::ListCombatants => {
            prompt.announce(&encounter.format_encounter());
            prompt.announce(&encounter.format_combatants());
        }
        MenuAction::NextEncounter => {
            encounter.prepare_next_encounter()?;
            prompt.announce(&encounter.format_encounter());
        }
        MenuAction::NextAttack => {
            turn::process_rounds(encounter, prompt)?;
        }
        MenuAction::SetInitiative => turn::set_encounter_initiative(encounter, prompt)?,
        MenuAction::CombatantInformation => {
            prompt.announce(&encounter.format_combatant_information())
        }
        MenuAction::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use melee_engine::testing::{row, sheet, Answer, MemoryStore, ScriptedPrompt};
    use melee_engine::{CharacterType, CombatSide, Dice};

    fn encounter() -> Encounter<MemoryStore> {
        let store = MemoryStore::new(
            vec![row(CombatSide::Friend, "ALIEL", 1), row(CombatSide::Foe, "ANTG", 1)],
            vec![
                sheet("ALIEL", CharacterType::PlayerCharacter, 4, 20, 12),
                sheet("ANTG", CharacterType::Monster, 3, 16, 9),
            ],
            Vec::new(),
        );
        Encounter::new(store, Dice::from_seed(1)).unwrap()
    }

    #[test]
    fn unknown_codes_are_reported_and_quit_ends_the_loop() {
        let mut enc = encounter();
        let mut prompt =
            ScriptedPrompt::new(vec![Answer::Number(42), Answer::Number(2), Answer::Number(99)]);
        run_menu(&mut enc, &mut prompt).unwrap();
        assert!(prompt.announced("*42* not a valid action"));
        assert!(prompt.announced("AALIEL1"));
        assert_eq!(prompt.remaining(), 0);
    }

    #[test]
    fn leaving_an_action_returns_to_the_menu() {
        let mut enc = encounter();
        let mut prompt = ScriptedPrompt::new(vec![
            Answer::Number(5),
            Answer::Exit,
            Answer::Number(3),
            Answer::Number(99),
        ]);
        run_menu(&mut enc, &mut prompt).unwrap();
        assert!(prompt.announced("Returned to menu"));
        assert_eq!(enc.encounter_number, 2);
    }
}
