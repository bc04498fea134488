//! Ceremony role-holders and their display grouping.

use serde::{Deserialize, Serialize};

use crate::deserializers::de_cell_string;

/// Display order for entourage categories. Matching is case-insensitive;
/// categories not listed here follow in the order they first appear.
pub const CATEGORY_ORDER: &[&str] = &[
    "Parents of the Groom",
    "Parents of the Bride",
    "Parents of the Celebrant",
    "Best Man",
    "Maid of Honor",
    "Matron of Honor",
    "Escort",
    "Groomsmen",
    "Bridesmaids",
    "Secondary Sponsors",
    "Candle Sponsors",
    "Veil Sponsors",
    "Cord Sponsors",
    "18 Roses",
    "18 Candles",
    "18 Treasures",
    "Ring Bearer",
    "Coin Bearer",
    "Bible Bearer",
    "Flower Girls",
];

const UNCATEGORIZED: &str = "Others";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntourageMember {
    #[serde(rename = "Name", default, deserialize_with = "de_cell_string")]
    pub name: String,
    #[serde(rename = "RoleCategory", default, deserialize_with = "de_cell_string")]
    pub role_category: String,
    #[serde(rename = "RoleTitle", default, deserialize_with = "de_cell_string")]
    pub role_title: String,
    #[serde(rename = "Email", default, deserialize_with = "de_cell_string")]
    pub email: String,
}

/// Two members shown side by side; the last pair of an odd group is half empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPair {
    pub left: EntourageMember,
    pub right: Option<EntourageMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntourageGroup {
    pub category: String,
    pub pairs: Vec<MemberPair>,
}

fn rank(category: &str) -> Option<usize> {
    CATEGORY_ORDER
        .iter()
        .position(|known| known.eq_ignore_ascii_case(category))
}

/// Groups members by category in [`CATEGORY_ORDER`], pairing each group
/// two-by-two in sheet order. Rows without a name are skipped.
pub fn group_entourage(members: &[EntourageMember]) -> Vec<EntourageGroup> {
    let mut buckets: Vec<(String, Vec<EntourageMember>)> = Vec::new();
    for member in members.iter().filter(|m| !m.name.is_empty()) {
        let category = match member.role_category.as_str() {
            "" => UNCATEGORIZED.to_string(),
            c => rank(c)
                .map(|i| CATEGORY_ORDER[i].to_string())
                .unwrap_or_else(|| c.to_string()),
        };
        match buckets
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&category))
        {
            Some((_, list)) => list.push(member.clone()),
            None => buckets.push((category, vec![member.clone()])),
        }
    }

    // Stable sort keeps first-seen order among unknown categories.
    buckets.sort_by_key(|(category, _)| match rank(category) {
        Some(i) => (0, i),
        None if category == UNCATEGORIZED => (2, 0),
        None => (1, 0),
    });

    buckets
        .into_iter()
        .map(|(category, list)| EntourageGroup {
            category,
            pairs: pair_up(list),
        })
        .collect()
}

fn pair_up(list: Vec<EntourageMember>) -> Vec<MemberPair> {
    let mut pairs = Vec::with_capacity(list.len().div_ceil(2));
    let mut iter = list.into_iter();
    while let Some(left) = iter.next() {
        pairs.push(MemberPair {
            left,
            right: iter.next(),
        });
    }
    pairs
}
