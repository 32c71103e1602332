use gambit::combat::{compose, AttributeProfile};
use gambit::data::{Item, ModifierField, Slot};
use proptest::prelude::*;

const NUMERIC: [ModifierField; 7] = [
    ModifierField::Attack,
    ModifierField::Combo,
    ModifierField::ChargeTime,
    ModifierField::Strength,
    ModifierField::Magic,
    ModifierField::Vitality,
    ModifierField::Speed,
];

const FLAGS: [ModifierField; 7] = [
    ModifierField::Brawler,
    ModifierField::Berserk,
    ModifierField::Haste,
    ModifierField::Bravery,
    ModifierField::Focus,
    ModifierField::Adrenaline,
    ModifierField::ComboExtension,
];

fn item(name: &'static str) -> impl Strategy<Value = Item> {
    (
        proptest::collection::vec((0..NUMERIC.len(), -50_i32..=50), 0..4),
        proptest::collection::vec(0..FLAGS.len(), 0..3),
    )
        .prop_map(move |(numbers, flags)| {
            let mut item = Item::new(name);
            for (field, delta) in numbers {
                item = item.with_number(NUMERIC[field], f64::from(delta));
            }
            for field in flags {
                item = item.with_flag(FLAGS[field]);
            }
            item
        })
}

fn base() -> AttributeProfile {
    AttributeProfile {
        strength: 40.0,
        magic: 30.0,
        vitality: 35.0,
        speed: 30.0,
        ..AttributeProfile::default()
    }
}

proptest! {
    #[test]
    fn numeric_merge_is_order_independent(a in item("A"), b in item("B")) {
        let forward = compose(&base(), [(Slot::Helm, &a), (Slot::Accessory, &b)]).unwrap();
        let backward = compose(&base(), [(Slot::Accessory, &b), (Slot::Helm, &a)]).unwrap();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn granting_a_boon_twice_equals_granting_it_once(flag in 0..FLAGS.len(), a in item("A")) {
        let grant = Item::new("Grant").with_flag(FLAGS[flag]);
        let again = Item::new("Again").with_flag(FLAGS[flag]);
        let once = compose(&base(), [(Slot::Helm, &a), (Slot::Armor, &grant)]).unwrap();
        let twice = compose(
            &base(),
            [(Slot::Helm, &a), (Slot::Armor, &grant), (Slot::Accessory, &again)],
        )
        .unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn composing_an_item_onto_itself_is_idempotent_for_flags(a in item("A")) {
        let once = compose(&base(), [(Slot::Helm, &a)]).unwrap();
        let twice = compose(&base(), [(Slot::Helm, &a), (Slot::Accessory, &a)]).unwrap();
        prop_assert_eq!(once.boons, twice.boons);
        prop_assert_eq!(once.elements, twice.elements);
    }
}
