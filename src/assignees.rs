//! Static assignee directory.
//!
//! There is no user management; the board ships with a fixed roster and
//! tasks reference assignees by id.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Assignee {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub avatar_url: String,
    pub role: String,
}

/// The full assignee roster.
pub fn all() -> Vec<Assignee> {
    vec![
        Assignee {
            id: "1".to_string(),
            name: "Alex Johnson".to_string(),
            initials: "AJ".to_string(),
            avatar_url: "https://ui-avatars.com/api/?name=Alex+Johnson&background=random"
                .to_string(),
            role: "Frontend Developer".to_string(),
        },
        Assignee {
            id: "2".to_string(),
            name: "Taylor Smith".to_string(),
            initials: "TS".to_string(),
            avatar_url: "https://api.dicebear.com/7.x/personas/svg?seed=Taylor".to_string(),
            role: "UX Designer".to_string(),
        },
        Assignee {
            id: "3".to_string(),
            name: "Jordan Lee".to_string(),
            initials: "JL".to_string(),
            avatar_url: "https://ui-avatars.com/api/?name=Jordan+Lee&background=random"
                .to_string(),
            role: "Backend Developer".to_string(),
        },
        Assignee {
            id: "4".to_string(),
            name: "Casey Morgan".to_string(),
            initials: "CM".to_string(),
            avatar_url: "https://api.dicebear.com/7.x/personas/svg?seed=Casey".to_string(),
            role: "Project Manager".to_string(),
        },
        Assignee {
            id: "5".to_string(),
            name: "Riley Davis".to_string(),
            initials: "RD".to_string(),
            avatar_url: "https://ui-avatars.com/api/?name=Riley+Davis&background=random"
                .to_string(),
            role: "QA Engineer".to_string(),
        },
    ]
}
