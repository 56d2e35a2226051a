//! Save/load round trips through JSON text.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use reliquary_economy::{
    Bag, BagSnapshot, Catalog, EconomyError, EquipmentSet, EquipmentSlot, EquipmentSnapshot,
    ItemGenerator, PersistenceCodec, Wallet, WalletSnapshot,
};

const ITEMS: &str = r#"
    [[templates]]
    id = "ring-of-wits"
    base_name = "Ring of Wits"
    category = "Equipment"
    equippable = true
    equip_slot = "RingLeft"
    allowed_affixes = ["Scholar", "Sorcerer", "Paragon"]

    [[templates]]
    id = "ore"
    base_name = "Ore"
    category = "Material"
"#;

#[test]
fn test_full_round_trip() {
    let catalog = Catalog::from_toml_str(ITEMS).unwrap();
    let generator = ItemGenerator::default();
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    let mut bag = Bag::new(6);
    for level in [1, 8, 15, 22, 30] {
        bag.add(generator.roll(catalog.get("ore").unwrap(), level, &mut rng))
            .unwrap();
    }
    bag.remove_at(2);
    let mut equipment = EquipmentSet::new();
    equipment.swap(
        EquipmentSlot::RingLeft,
        Some(generator.roll(catalog.get("ring-of-wits").unwrap(), 17, &mut rng)),
    );
    let wallet = Wallet::new(1234);

    let bag_json = PersistenceCodec::to_json(&PersistenceCodec::save_bag(&bag)).unwrap();
    let eq_json = PersistenceCodec::to_json(&PersistenceCodec::save_equipment(&equipment)).unwrap();
    let wallet_json = PersistenceCodec::to_json(&PersistenceCodec::save_wallet(&wallet)).unwrap();

    let mut loaded_bag = Bag::default();
    let mut loaded_equipment = EquipmentSet::new();
    let mut loaded_wallet = Wallet::default();

    let bag_snapshot: BagSnapshot = PersistenceCodec::from_json(&bag_json).unwrap();
    let eq_snapshot: EquipmentSnapshot = PersistenceCodec::from_json(&eq_json).unwrap();
    let wallet_snapshot: WalletSnapshot = PersistenceCodec::from_json(&wallet_json).unwrap();
    PersistenceCodec::load_bag(&mut loaded_bag, &bag_snapshot, &catalog).unwrap();
    PersistenceCodec::load_equipment(&mut loaded_equipment, &eq_snapshot, &catalog).unwrap();
    PersistenceCodec::load_wallet(&mut loaded_wallet, &wallet_snapshot).unwrap();

    assert_eq!(loaded_bag.capacity(), bag.capacity());
    for index in 0..bag.capacity() {
        assert_eq!(loaded_bag.item(index), bag.item(index), "bag slot {index}");
    }
    for slot in EquipmentSlot::ALL {
        assert_eq!(loaded_equipment.get(slot), equipment.get(slot), "{slot:?}");
    }
    assert_eq!(loaded_wallet.amount(), 1234);
}

#[test]
fn test_newer_bag_snapshot_leaves_bag_alone() {
    let catalog = Catalog::from_toml_str(ITEMS).unwrap();
    let mut bag = Bag::new(3);
    let rx = bag.subscribe();

    let snapshot: BagSnapshot =
        PersistenceCodec::from_json(r#"{"version": 9, "capacity": 1, "slots": []}"#).unwrap();
    let err = PersistenceCodec::load_bag(&mut bag, &snapshot, &catalog).unwrap_err();

    assert_eq!(err, EconomyError::UnsupportedVersion { found: 9, supported: 1 });
    assert_eq!(bag.capacity(), 3);
    assert_eq!(rx.pending_count(), 0);
}
