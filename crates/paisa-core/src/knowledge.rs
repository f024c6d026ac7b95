//! Static app knowledge base
//!
//! Maps app identifiers to a friendly name and a commerce category, and
//! decides which identifiers are worth correlating at all. The table grows
//! by hand as new apps show up in the field.

/// Friendly name and commerce category for a known app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub category: &'static str,
}

/// Categories where money typically changes hands inside the app.
pub const TRANSACTIONAL_CATEGORIES: [&str; 5] = [
    "Food Delivery",
    "Transport",
    "Shopping",
    "Groceries",
    "Travel",
];

/// Identifier prefixes that never explain a payment: system surfaces,
/// launchers across vendors, keyboards, dialers, and stock utility apps.
const IRRELEVANT_PREFIXES: [&str; 20] = [
    "com.android.systemui",
    "com.android.launcher",
    "com.google.android.apps.nexuslauncher",
    "com.miui.home",
    "com.sec.android.app.launcher",
    "com.android.settings",
    "com.google.android.inputmethod",
    "com.android.inputmethod",
    "com.google.android.permissioncontroller",
    "com.android.vending",
    "com.google.android.gms",
    "com.google.android.deskclock",
    "com.android.dialer",
    "com.google.android.dialer",
    "com.android.camera",
    "com.google.android.GoogleCamera",
    "com.android.gallery3d",
    "com.google.android.apps.photos",
    "com.android.contacts",
    "com.google.android.contacts",
];

/// Look up a known app identifier.
pub fn lookup(app_id: &str) -> Option<AppInfo> {
    let info = match app_id {
        // Food delivery
        "com.application.zomato" => AppInfo {
            name: "Zomato",
            category: "Food Delivery",
        },
        "in.swiggy.android" => AppInfo {
            name: "Swiggy",
            category: "Food Delivery",
        },
        "com.done.faasos" => AppInfo {
            name: "EatSure",
            category: "Food Delivery",
        },

        // Transport / ride hailing
        "com.ubercab" => AppInfo {
            name: "Uber",
            category: "Transport",
        },
        "com.olacabs.customer" => AppInfo {
            name: "Ola",
            category: "Transport",
        },
        "com.rapido.passenger" => AppInfo {
            name: "Rapido",
            category: "Transport",
        },
        "in.outerspace.namma_yatri" => AppInfo {
            name: "Namma Yatri",
            category: "Transport",
        },

        // Payment apps
        "com.google.android.apps.nbu.paisa.user" => AppInfo {
            name: "Google Pay",
            category: "Payment App",
        },
        "com.phonepe.app" => AppInfo {
            name: "PhonePe",
            category: "Payment App",
        },
        "net.one97.paytm" => AppInfo {
            name: "Paytm",
            category: "Payment App",
        },

        // Shopping
        "com.amazon.mShop.android.shopping" => AppInfo {
            name: "Amazon",
            category: "Shopping",
        },
        "com.flipkart.android" => AppInfo {
            name: "Flipkart",
            category: "Shopping",
        },
        "com.myntra.android" => AppInfo {
            name: "Myntra",
            category: "Shopping",
        },
        "club.cred" => AppInfo {
            name: "CRED",
            category: "Finance",
        },

        // Entertainment
        "com.google.android.youtube" => AppInfo {
            name: "YouTube",
            category: "Entertainment",
        },
        "com.netflix.mediaclient" => AppInfo {
            name: "Netflix",
            category: "Entertainment",
        },
        "in.startv.hotstar" => AppInfo {
            name: "Hotstar",
            category: "Entertainment",
        },

        // Travel
        "com.makemytrip" => AppInfo {
            name: "MakeMyTrip",
            category: "Travel",
        },
        "com.goibibo" => AppInfo {
            name: "Goibibo",
            category: "Travel",
        },
        "com.irctc.vikalp" => AppInfo {
            name: "IRCTC",
            category: "Travel",
        },

        // Groceries
        "com.bigbasket.mobileapp" => AppInfo {
            name: "BigBasket",
            category: "Groceries",
        },
        "com.zeptoconsumerapp" => AppInfo {
            name: "Zepto",
            category: "Groceries",
        },
        "com.grofers.customerapp" => AppInfo {
            name: "Blinkit",
            category: "Groceries",
        },

        _ => return None,
    };
    Some(info)
}

/// Whether an app identifier is worth considering for correlation at all.
/// An open keyboard or launcher explains nothing about a payment.
pub fn is_relevant(app_id: &str) -> bool {
    !IRRELEVANT_PREFIXES
        .iter()
        .any(|prefix| app_id.starts_with(prefix))
}

/// Whether a category is one where payments usually originate.
pub fn is_transactional(category: &str) -> bool {
    TRANSACTIONAL_CATEGORIES.contains(&category)
}

/// Friendly name for an app identifier, falling back to the last
/// dot-delimited segment for unknown apps.
pub fn display_name(app_id: &str) -> String {
    match lookup(app_id) {
        Some(info) => info.name.to_string(),
        None => app_id.rsplit('.').next().unwrap_or(app_id).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_app() {
        let info = lookup("com.application.zomato").unwrap();
        assert_eq!(info.name, "Zomato");
        assert_eq!(info.category, "Food Delivery");
        assert!(lookup("com.example.unheard.of").is_none());
    }

    #[test]
    fn test_system_surfaces_are_irrelevant() {
        assert!(!is_relevant("com.android.systemui"));
        assert!(!is_relevant("com.google.android.apps.nexuslauncher"));
        assert!(!is_relevant("com.google.android.inputmethod.latin"));
        assert!(!is_relevant("com.google.android.gms.auth"));
        assert!(is_relevant("com.application.zomato"));
        assert!(is_relevant("com.some.indie.game"));
    }

    #[test]
    fn test_transactional_categories() {
        assert!(is_transactional("Food Delivery"));
        assert!(is_transactional("Travel"));
        assert!(!is_transactional("Payment App"));
        assert!(!is_transactional("Entertainment"));
    }

    #[test]
    fn test_display_name_falls_back_to_last_segment() {
        assert_eq!(display_name("com.ubercab"), "Uber");
        assert_eq!(display_name("com.unknown.vendor.superpay"), "superpay");
        assert_eq!(display_name("bareword"), "bareword");
    }
}
