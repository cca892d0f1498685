/// Fixed category table: stable key to display label. Recipes store the
/// key; labels are presentation data only.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("zavtraki", "Завтраки"),
    ("bulion", "Бульоны"),
    ("zakuski", "Закузки"),
    ("napitki", "Напитки"),
    ("osnovblud", "Основные блюда"),
    ("pastapizza", "Пасты и Пиццы"),
    ("rizzoto", "Ризотто"),
    ("salati", "Салаты"),
    ("souse", "Соусы и Маринады"),
    ("soup", "Супы"),
    ("sandwich", "Сендвичи"),
    ("vipechka", "Выпечка и Десерты"),
    ("zagotovki", "Заготовки"),
];

pub fn label(key: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

pub fn is_known(key: &str) -> bool {
    label(key).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        assert_eq!(label("zavtraki"), Some("Завтраки"));
        assert_eq!(label("soup"), Some("Супы"));
        assert!(is_known("zagotovki"));
    }

    #[test]
    fn unknown_keys_do_not() {
        assert_eq!(label("desserts"), None);
        assert!(!is_known(""));
        assert!(!is_known("Супы")); // labels are not keys
    }

    #[test]
    fn table_has_thirteen_categories() {
        assert_eq!(CATEGORIES.len(), 13);
    }
}
