//! Splits a fetched record list into the live and VOD display lists

use crate::models::{StreamKind, StreamLists, StreamRecord};

/// Partition by stream key, index and reverse the VOD entries, order live
/// entries newest first.
pub fn classify(records: Vec<StreamRecord>) -> StreamLists {
    let (mut live, mut vod): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| r.kind() == StreamKind::Live);

    // Index reflects discovery order and must be assigned before reversing
    for (i, record) in vod.iter_mut().enumerate() {
        record.index = Some(i.to_string());
    }
    vod.reverse();

    // sort_by is stable, ties keep fetch order
    live.sort_by(|a, b| start_key(b).cmp(&start_key(a)));

    StreamLists { live, vod }
}

fn start_key(record: &StreamRecord) -> u64 {
    record
        .start_at
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(key: &str, start_at: &str) -> StreamRecord {
        StreamRecord {
            url: Some(key.to_string()),
            name: key.to_uppercase(),
            start_at: Some(start_at.to_string()),
            last_update_at: Some(start_at.to_string()),
            ..Default::default()
        }
    }

    fn vod(name: &str, upload_at: &str) -> StreamRecord {
        StreamRecord {
            name: name.to_string(),
            upload_at: Some(upload_at.to_string()),
            ..Default::default()
        }
    }

    fn mixed(n: usize) -> Vec<StreamRecord> {
        (0..n)
            .map(|i| {
                if i % 3 == 0 {
                    vod(&format!("v{}", i), &i.to_string())
                } else {
                    live(&format!("l{}", i), &((i * 37) % 11).to_string())
                }
            })
            .collect()
    }

    #[test]
    fn test_single_live_and_vod() {
        let lists = classify(vec![live("s1", "100"), vod("B", "50")]);
        assert_eq!(lists.live.len(), 1);
        assert_eq!(lists.live[0].url.as_deref(), Some("s1"));
        assert_eq!(lists.live[0].index, None);
        assert_eq!(lists.vod.len(), 1);
        assert_eq!(lists.vod[0].name, "B");
        assert_eq!(lists.vod[0].index.as_deref(), Some("0"));
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_list() {
        for n in 0..20 {
            let records = mixed(n);
            let expected_live = records.iter().filter(|r| r.kind() == StreamKind::Live).count();
            let lists = classify(records);
            assert_eq!(lists.live.len() + lists.vod.len(), n);
            assert_eq!(lists.live.len(), expected_live);
            assert!(lists.live.iter().all(|r| !r.url.as_deref().unwrap_or("").is_empty()));
            assert!(lists.vod.iter().all(|r| r.url.as_deref().unwrap_or("").is_empty()));
        }
    }

    #[test]
    fn test_vod_indices_follow_discovery_order() {
        let lists = classify(vec![vod("first", "1"), live("x", "5"), vod("second", "2"), vod("third", "3")]);
        let names: Vec<_> = lists.vod.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
        let indices: Vec<_> = lists.vod.iter().map(|r| r.index.clone().unwrap()).collect();
        assert_eq!(indices, vec!["2", "1", "0"]);
    }

    #[test]
    fn test_vod_indices_are_contiguous() {
        let lists = classify(mixed(17));
        let mut indices: Vec<usize> = lists
            .vod
            .iter()
            .map(|r| r.index.as_deref().unwrap().parse().unwrap())
            .collect();
        indices.sort();
        assert_eq!(indices, (0..lists.vod.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_live_sorted_by_start_descending() {
        let lists = classify(mixed(30));
        for pair in lists.live.windows(2) {
            assert!(start_key(&pair[0]) >= start_key(&pair[1]));
        }
    }

    #[test]
    fn test_live_sort_is_numeric() {
        let lists = classify(vec![live("a", "9"), live("b", "100"), live("c", "20")]);
        let keys: Vec<_> = lists.live.iter().map(|r| r.url.clone().unwrap()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_live_ties_keep_fetch_order() {
        let lists = classify(vec![live("a", "5"), live("b", "5"), live("c", "7")]);
        let keys: Vec<_> = lists.live.iter().map(|r| r.url.clone().unwrap()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_unparsable_start_sorts_as_zero() {
        let lists = classify(vec![live("bad", "soon"), live("good", "1")]);
        assert_eq!(lists.live[0].url.as_deref(), Some("good"));
        assert_eq!(lists.live[1].url.as_deref(), Some("bad"));
    }

    #[test]
    fn test_live_sort_covers_full_u64_range() {
        let lists = classify(vec![live("small", "100"), live("huge", "9223372036854775808")]);
        let keys: Vec<_> = lists.live.iter().map(|r| r.url.clone().unwrap()).collect();
        assert_eq!(keys, vec!["huge", "small"]);
    }

    #[test]
    fn test_empty_key_is_vod() {
        let mut record = live("", "10");
        record.upload_at = Some("10".to_string());
        let lists = classify(vec![record]);
        assert!(lists.live.is_empty());
        assert_eq!(lists.vod[0].index.as_deref(), Some("0"));
    }
}
