use serde::Serialize;

/// One entry of the fixed community catalog. The list is hardcoded;
/// there is no community CRUD.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Community {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const COMMUNITIES: &[Community] = &[
    Community {
        id: "general",
        name: "General",
        description: "Campus-wide discussion",
    },
    Community {
        id: "academics",
        name: "Academics",
        description: "Courses, exams and study groups",
    },
    Community {
        id: "campus-life",
        name: "Campus Life",
        description: "Clubs, sports and everything social",
    },
    Community {
        id: "housing",
        name: "Housing",
        description: "Dorms, roommates and off-campus living",
    },
    Community {
        id: "careers",
        name: "Careers",
        description: "Internships, jobs and career advice",
    },
    Community {
        id: "events",
        name: "Events",
        description: "Announcements for campus events",
    },
];

pub fn all() -> &'static [Community] {
    COMMUNITIES
}

pub fn find(id: &str) -> Option<&'static Community> {
    COMMUNITIES.iter().find(|community| community.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_community() {
        let community = find("academics").expect("known community");
        assert_eq!(community.name, "Academics");
    }

    #[test]
    fn unknown_community_is_none() {
        assert!(find("underwater-basket-weaving").is_none());
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = all().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }
}
