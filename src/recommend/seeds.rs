//! Round-robin seed selection across the considered emotions.

use std::collections::HashSet;

use super::selection::ConsideredEmotion;
use crate::catalog::{SeedCategory, SeedSet};
use crate::emotion::ProfileTable;

/// Pick up to `cap` discovery seeds.
///
/// Each emotion offers its candidates as genres, then artists, then tracks.
/// Emotions take turns in probability order, one pick per emotion per round;
/// an identifier already chosen (in any category) is skipped.
pub fn select_seeds(profiles: &ProfileTable, considered: &[ConsideredEmotion], cap: usize) -> SeedSet {
    let mut queues: Vec<Vec<(SeedCategory, &str)>> = considered
        .iter()
        .map(|c| {
            let profile = profiles.get(c.emotion);
            let genres = profile.genres.iter().map(|s| (SeedCategory::Genre, s.as_str()));
            let artists = profile.artists.iter().map(|s| (SeedCategory::Artist, s.as_str()));
            let tracks = profile.tracks.iter().map(|s| (SeedCategory::Track, s.as_str()));
            // Reversed so the next candidate can be popped from the end
            let mut queue: Vec<_> = genres.chain(artists).chain(tracks).collect();
            queue.reverse();
            queue
        })
        .collect();

    let mut seeds = SeedSet::default();
    let mut chosen: HashSet<&str> = HashSet::new();

    while seeds.len() < cap {
        let mut picked_this_round = false;

        for queue in queues.iter_mut() {
            if seeds.len() >= cap {
                break;
            }
            while let Some((category, id)) = queue.pop() {
                if chosen.insert(id) {
                    seeds.push(category, id);
                    picked_this_round = true;
                    break;
                }
            }
        }

        if !picked_this_round {
            break;
        }
    }

    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{Emotion, EmotionScore};
    use crate::recommend::select_considered;

    fn considered(labels: &[&str]) -> Vec<ConsideredEmotion> {
        let n = labels.len() as f32;
        let scores: Vec<_> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| EmotionScore::new(*l, (n - i as f32) / n))
            .collect();
        select_considered(&scores, labels.len()).unwrap()
    }

    #[test]
    fn test_single_emotion_takes_its_genres_in_order() {
        let profiles = ProfileTable::builtin();
        let seeds = select_seeds(&profiles, &considered(&["joy"]), 5);
        assert_eq!(seeds.genres, profiles.get(Emotion::Joy).genres);
        assert!(seeds.artists.is_empty());
    }

    #[test]
    fn test_round_robin_alternates_emotions() {
        let profiles = ProfileTable::builtin();
        let seeds = select_seeds(&profiles, &considered(&["joy", "sadness"]), 4);
        assert_eq!(seeds.genres, vec!["pop", "sad", "dance", "blues"]);
    }

    #[test]
    fn test_shared_candidates_skipped() {
        let profiles = ProfileTable::builtin();
        // Joy and excitement both lead with pop and dance
        let seeds = select_seeds(&profiles, &considered(&["joy", "excitement"]), 5);
        assert_eq!(
            seeds.genres,
            vec!["pop", "dance", "funk", "electronic", "happy"]
        );
    }

    #[test]
    fn test_cap_and_uniqueness_for_all_labels() {
        let profiles = ProfileTable::builtin();
        let labels: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();

        for n in 1..=labels.len() {
            for cap in [1, 3, 5] {
                let seeds = select_seeds(&profiles, &considered(&labels[..n]), cap);
                assert!(seeds.len() <= cap);
                let unique: HashSet<_> = seeds.iter().map(|(_, id)| id).collect();
                assert_eq!(unique.len(), seeds.len());
            }
        }
    }

    #[test]
    fn test_artists_follow_genres() {
        let mut profiles: Vec<_> = ProfileTable::builtin().iter().cloned().collect();
        let calm = &mut profiles[Emotion::Relief.index()];
        calm.genres = vec!["ambient".to_string()];
        calm.artists = vec!["artist-1".to_string()];
        calm.tracks = vec!["track-1".to_string()];
        let profiles = ProfileTable::from_profiles(profiles).unwrap();

        let seeds = select_seeds(&profiles, &considered(&["relief"]), 5);
        assert_eq!(seeds.genres, vec!["ambient"]);
        assert_eq!(seeds.artists, vec!["artist-1"]);
        assert_eq!(seeds.tracks, vec!["track-1"]);
    }

    #[test]
    fn test_exhausted_candidates_stop_early() {
        let profiles = ProfileTable::builtin();
        let seeds = select_seeds(&profiles, &considered(&["joy"]), 50);
        assert_eq!(seeds.len(), profiles.get(Emotion::Joy).seed_count());
    }
}
