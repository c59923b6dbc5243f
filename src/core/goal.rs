//! Goal reference data - the 17 UN Sustainable Development Goals.
//!
//! The goal table is fixed: it is defined here once, seeded into the database on
//! startup, and loaded into a [`GoalCatalog`] that the interface layer shares
//! instead of rebuilding goal metadata per request.

use crate::{
    entities::{Goal, goal},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Number of goals in the reference table.
pub const GOAL_COUNT: i32 = 17;

/// Static definition of a goal, used for seeding.
#[derive(Debug, Clone, Copy)]
pub struct GoalSeed {
    /// Goal number, 1 through 17
    pub number: i32,
    /// Short display name
    pub name: &'static str,
    /// One-sentence description
    pub description: &'static str,
    /// Official SDG colour
    pub color_code: &'static str,
}

/// The 17 SDGs with their official names and colours.
pub const SDG_GOALS: [GoalSeed; 17] = [
    GoalSeed {
        number: 1,
        name: "No Poverty",
        description: "End poverty in all its forms everywhere",
        color_code: "#E5243B",
    },
    GoalSeed {
        number: 2,
        name: "Zero Hunger",
        description: "End hunger, achieve food security and improved nutrition and promote sustainable agriculture",
        color_code: "#DDA63A",
    },
    GoalSeed {
        number: 3,
        name: "Good Health and Well-being",
        description: "Ensure healthy lives and promote well-being for all at all ages",
        color_code: "#4C9F38",
    },
    GoalSeed {
        number: 4,
        name: "Quality Education",
        description: "Ensure inclusive and equitable quality education and promote lifelong learning opportunities for all",
        color_code: "#C5192D",
    },
    GoalSeed {
        number: 5,
        name: "Gender Equality",
        description: "Achieve gender equality and empower all women and girls",
        color_code: "#FF3A21",
    },
    GoalSeed {
        number: 6,
        name: "Clean Water and Sanitation",
        description: "Ensure availability and sustainable management of water and sanitation for all",
        color_code: "#26BDE2",
    },
    GoalSeed {
        number: 7,
        name: "Affordable and Clean Energy",
        description: "Ensure access to affordable, reliable, sustainable and modern energy for all",
        color_code: "#FCC30B",
    },
    GoalSeed {
        number: 8,
        name: "Decent Work and Economic Growth",
        description: "Promote sustained, inclusive and sustainable economic growth, full and productive employment and decent work for all",
        color_code: "#A21942",
    },
    GoalSeed {
        number: 9,
        name: "Industry, Innovation and Infrastructure",
        description: "Build resilient infrastructure, promote inclusive and sustainable industrialization and foster innovation",
        color_code: "#FD6925",
    },
    GoalSeed {
        number: 10,
        name: "Reduced Inequality",
        description: "Reduce inequality within and among countries",
        color_code: "#DD1367",
    },
    GoalSeed {
        number: 11,
        name: "Sustainable Cities and Communities",
        description: "Make cities and human settlements inclusive, safe, resilient and sustainable",
        color_code: "#FD9D24",
    },
    GoalSeed {
        number: 12,
        name: "Responsible Consumption and Production",
        description: "Ensure sustainable consumption and production patterns",
        color_code: "#BF8B2E",
    },
    GoalSeed {
        number: 13,
        name: "Climate Action",
        description: "Take urgent action to combat climate change and its impacts",
        color_code: "#3F7E44",
    },
    GoalSeed {
        number: 14,
        name: "Life Below Water",
        description: "Conserve and sustainably use the oceans, seas and marine resources for sustainable development",
        color_code: "#0A97D9",
    },
    GoalSeed {
        number: 15,
        name: "Life on Land",
        description: "Protect, restore and promote sustainable use of terrestrial ecosystems, sustainably manage forests, combat desertification, and halt and reverse land degradation and halt biodiversity loss",
        color_code: "#56C02B",
    },
    GoalSeed {
        number: 16,
        name: "Peace, Justice and Strong Institutions",
        description: "Promote peaceful and inclusive societies for sustainable development, provide access to justice for all and build effective, accountable and inclusive institutions at all levels",
        color_code: "#00689D",
    },
    GoalSeed {
        number: 17,
        name: "Partnerships for the Goals",
        description: "Strengthen the means of implementation and revitalize the global partnership for sustainable development",
        color_code: "#19486A",
    },
];

/// Returns true if `number` names one of the 17 goals.
#[must_use]
pub const fn is_valid_goal(number: i32) -> bool {
    number >= 1 && number <= GOAL_COUNT
}

/// Inserts any of the 17 goals that are missing from the database.
///
/// Existing rows are left untouched, so this is safe to run on every startup.
/// Returns the number of goals inserted.
pub async fn seed_goals(db: &DatabaseConnection) -> Result<u64> {
    let existing: Vec<i32> = Goal::find()
        .all(db)
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect();

    let mut inserted = 0;
    for seed in SDG_GOALS.iter().filter(|s| !existing.contains(&s.number)) {
        goal::ActiveModel {
            id: Set(seed.number),
            name: Set(seed.name.to_string()),
            description: Set(seed.description.to_string()),
            color_code: Set(seed.color_code.to_string()),
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    if inserted > 0 {
        info!("Seeded {} SDG goals", inserted);
    } else {
        debug!("All SDG goals already present");
    }
    Ok(inserted)
}

/// Retrieves all goals ordered by number.
pub async fn get_all_goals(db: &DatabaseConnection) -> Result<Vec<goal::Model>> {
    Goal::find()
        .order_by_asc(goal::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Read-only, loaded-once view of the goal table.
#[derive(Debug, Clone, Default)]
pub struct GoalCatalog {
    goals: BTreeMap<i32, goal::Model>,
}

impl GoalCatalog {
    /// Loads the catalog from the database. Fails if any of the 17 goals is missing.
    pub async fn load(db: &DatabaseConnection) -> Result<Self> {
        let goals: BTreeMap<i32, goal::Model> = get_all_goals(db)
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();

        if let Some(missing) = (1..=GOAL_COUNT).find(|n| !goals.contains_key(n)) {
            return Err(Error::GoalNotFound { number: missing });
        }
        Ok(Self { goals })
    }

    /// Builds the catalog straight from the static table, without a database.
    #[must_use]
    pub fn from_seed() -> Self {
        let goals = SDG_GOALS
            .iter()
            .map(|s| {
                (
                    s.number,
                    goal::Model {
                        id: s.number,
                        name: s.name.to_string(),
                        description: s.description.to_string(),
                        color_code: s.color_code.to_string(),
                    },
                )
            })
            .collect();
        Self { goals }
    }

    /// Looks up a goal by number.
    #[must_use]
    pub fn get(&self, number: i32) -> Option<&goal::Model> {
        self.goals.get(&number)
    }

    /// Iterates goals in number order.
    pub fn iter(&self) -> impl Iterator<Item = &goal::Model> {
        self.goals.values()
    }

    /// Number of goals in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.goals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_empty_db;

    #[test]
    fn test_seed_table_is_complete_and_ordered() {
        for (idx, seed) in SDG_GOALS.iter().enumerate() {
            assert_eq!(seed.number, i32::try_from(idx).unwrap() + 1);
            assert!(seed.color_code.starts_with('#'));
            assert!(!seed.name.is_empty());
        }
    }

    #[test]
    fn test_is_valid_goal() {
        assert!(is_valid_goal(1));
        assert!(is_valid_goal(17));
        assert!(!is_valid_goal(0));
        assert!(!is_valid_goal(18));
        assert!(!is_valid_goal(-3));
    }

    #[tokio::test]
    async fn test_seed_goals_is_idempotent() -> Result<()> {
        let db = setup_empty_db().await?;

        assert_eq!(seed_goals(&db).await?, 17);
        assert_eq!(seed_goals(&db).await?, 0);

        let goals = get_all_goals(&db).await?;
        assert_eq!(goals.len(), 17);
        assert_eq!(goals[0].name, "No Poverty");
        assert_eq!(goals[16].name, "Partnerships for the Goals");

        Ok(())
    }

    #[tokio::test]
    async fn test_catalog_requires_all_goals() -> Result<()> {
        let db = setup_empty_db().await?;
        let result = GoalCatalog::load(&db).await;
        assert!(matches!(result, Err(Error::GoalNotFound { number: 1 })));

        seed_goals(&db).await?;
        let catalog = GoalCatalog::load(&db).await?;
        assert_eq!(catalog.len(), 17);
        assert_eq!(catalog.get(6).unwrap().name, "Clean Water and Sanitation");
        assert_eq!(catalog.iter().map(|g| g.id).collect::<Vec<_>>(), (1..=17).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_catalog_from_seed_matches_table() {
        let catalog = GoalCatalog::from_seed();
        assert_eq!(catalog.len(), SDG_GOALS.len());
        assert_eq!(catalog.get(16).unwrap().color_code, "#00689D");
        assert!(catalog.get(0).is_none());
    }
}
