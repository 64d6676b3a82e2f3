use std::collections::HashSet;

use melee_engine::testing::{row, sheet, MemoryStore};
use melee_engine::{CharacterType, CombatSide, Dice, Encounter, Health};
use proptest::prelude::*;

fn horde(initiatives: &[i32]) -> Encounter<MemoryStore> {
    let rows =
        (1..=initiatives.len() as u32).map(|seq| row(CombatSide::Foe, "ORC", seq)).collect();
    let store =
        MemoryStore::new(rows, vec![sheet("ORC", CharacterType::Monster, 6, 19, 5)], Vec::new());
    let mut enc = Encounter::new(store, Dice::from_seed(0)).unwrap();
    for (c, &initiative) in enc.combatants_mut().iter_mut().zip(initiatives) {
        c.initiative = initiative;
    }
    enc
}

proptest! {
    #[test]
    fn duplicate_resolution_leaves_unique_descending_initiative(
        initiatives in prop::collection::vec(prop_oneof![0i32..7000, 6990i32..7000], 1..24),
    ) {
        let mut enc = horde(&initiatives);
        enc.check_duplicate_initiative();

        let values: Vec<i32> = enc.combatants().iter().map(|c| c.initiative).collect();
        let unique: HashSet<i32> = values.iter().copied().collect();
        prop_assert_eq!(unique.len(), values.len());
        prop_assert!(values.windows(2).all(|w| w[0] > w[1]));
        // the round's opening cursor reaches everyone
        prop_assert!(values.iter().all(|v| (0..=6999).contains(v)));
    }

    #[test]
    fn nonplayer_initiative_lands_in_the_active_band(seed in any::<u64>()) {
        let mut enc = horde(&[0]);
        *enc.dice_mut() = Dice::from_seed(seed);
        let initiative = enc.roll_nonplayer_initiative();
        prop_assert!((1001..=6999).contains(&initiative));
    }

    #[test]
    fn hit_points_stay_between_zero_and_max(
        max_hp in 1i32..200,
        steps in prop::collection::vec((any::<bool>(), -60i32..120), 0..40),
    ) {
        let mut health = Health::new(max_hp);
        for (is_damage, amount) in steps {
            if is_damage {
                health.take_damage(amount);
            } else {
                health.regenerate(amount.abs());
            }
            prop_assert!(health.hp >= 0 && health.hp <= max_hp);
        }
    }
}
