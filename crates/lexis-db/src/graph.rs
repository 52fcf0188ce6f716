use std::collections::HashMap;

use lexis_types::models::TranslationEdge;
use rusqlite::Connection;

use crate::DbResult;
use crate::models::parse_column;

/// Directed translation graph keyed by word id. Outgoing edges are kept in
/// display order (`order`, then edge id).
#[derive(Debug, Default)]
pub struct TranslationGraph {
    outgoing: HashMap<i64, Vec<TranslationEdge>>,
    incoming: HashMap<i64, Vec<i64>>,
}

impl TranslationGraph {
    pub fn from_edges(edges: impl IntoIterator<Item = TranslationEdge>) -> Self {
        let mut graph = Self::default();
        for edge in edges {
            graph
                .incoming
                .entry(edge.to_word_id)
                .or_default()
                .push(edge.from_word_id);
            graph
                .outgoing
                .entry(edge.from_word_id)
                .or_default()
                .push(edge);
        }
        for edges in graph.outgoing.values_mut() {
            edges.sort_by_key(|e| (e.order, e.id));
        }
        graph
    }

    /// Edges touching any of `word_ids`, in either direction.
    pub fn load_around(conn: &Connection, word_ids: &[i64]) -> DbResult<Self> {
        if word_ids.is_empty() {
            return Ok(Self::default());
        }

        let placeholders = vec!["?"; word_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, from_word_id, to_word_id, note, sort_order, status, created_at
             FROM translations
             WHERE from_word_id IN ({placeholders}) OR to_word_id IN ({placeholders})"
        );
        let params: Vec<&dyn rusqlite::ToSql> = word_ids
            .iter()
            .chain(word_ids.iter())
            .map(|id| id as &dyn rusqlite::ToSql)
            .collect();

        let mut stmt = conn.prepare(&sql)?;
        let edges = stmt
            .query_map(params.as_slice(), edge_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_edges(edges))
    }

    pub fn outgoing(&self, word_id: i64) -> &[TranslationEdge] {
        self.outgoing.get(&word_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of words that translate into `word_id`.
    pub fn incoming(&self, word_id: i64) -> &[i64] {
        self.incoming.get(&word_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every word joined to `word_id` by an edge in either direction.
    pub fn neighbours(&self, word_id: i64) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .outgoing(word_id)
            .iter()
            .map(|e| e.to_word_id)
            .chain(self.incoming(word_id).iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

}

pub(crate) fn edge_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TranslationEdge> {
    Ok(TranslationEdge {
        id: row.get(0)?,
        from_word_id: row.get(1)?,
        to_word_id: row.get(2)?,
        note: row.get(3)?,
        order: row.get(4)?,
        status: parse_column(row, 5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lexis_types::models::WordStatus;

    fn edge(id: i64, from: i64, to: i64, order: i64, status: WordStatus) -> TranslationEdge {
        TranslationEdge {
            id,
            from_word_id: from,
            to_word_id: to,
            note: String::new(),
            order,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn outgoing_edges_follow_display_order() {
        let graph = TranslationGraph::from_edges([
            edge(1, 10, 20, 2, WordStatus::Approved),
            edge(2, 10, 30, 1, WordStatus::Pending),
            edge(3, 40, 10, 0, WordStatus::Approved),
        ]);

        let targets: Vec<i64> = graph.outgoing(10).iter().map(|e| e.to_word_id).collect();
        assert_eq!(targets, vec![30, 20]);
        assert_eq!(graph.incoming(10), &[40]);
        assert_eq!(graph.neighbours(10), vec![20, 30, 40]);
    }
}
