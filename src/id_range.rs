//! Compact run-length text form of note id sets, e.g. `"1-3, 7"`.

/// Expands a Scapple id list. Tokens that are neither an integer nor an
/// inclusive `start-end` range are skipped.
pub fn decode_ranges(value: &str) -> Vec<u32> {
    let mut ids = Vec::new();
    for token in value.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.split_once('-') {
            Some((start, end)) => {
                let (Ok(start), Ok(end)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>())
                else {
                    continue;
                };
                if start <= end {
                    ids.extend(start..=end);
                }
            }
            None => {
                if let Ok(id) = token.parse::<u32>() {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

pub fn encode_ranges(ids: &[u32]) -> String {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut tokens: Vec<String> = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let (mut start, mut end) = (first, first);
    for id in iter {
        if id == end + 1 {
            end = id;
            continue;
        }
        tokens.push(range_token(start, end));
        start = id;
        end = id;
    }
    tokens.push(range_token(start, end));
    tokens.join(", ")
}

fn range_token(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start}-{end}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_singletons_and_ranges() {
        assert_eq!(decode_ranges("1-3, 7"), vec![1, 2, 3, 7]);
        assert_eq!(decode_ranges(" 4 ,5-5"), vec![4, 5]);
        assert!(decode_ranges("").is_empty());
        assert!(decode_ranges("   ").is_empty());
    }

    #[test]
    fn skips_malformed_tokens() {
        assert_eq!(decode_ranges("x, 2, 3-, -1, 9-7, 4"), vec![2, 4]);
    }

    #[test]
    fn encodes_runs() {
        assert_eq!(encode_ranges(&[7, 1, 2, 3]), "1-3, 7");
        assert_eq!(encode_ranges(&[5]), "5");
        assert_eq!(encode_ranges(&[]), "");
        assert_eq!(encode_ranges(&[2, 2, 3, 10, 11, 13]), "2-3, 10-11, 13");
    }

    #[test]
    fn decode_inverts_encode_after_normalizing() {
        let inputs: [&[u32]; 4] = [&[9, 3, 4, 4, 5, 0], &[1], &[], &[100, 2, 50, 51, 52]];
        for input in inputs {
            let mut expected = input.to_vec();
            expected.sort_unstable();
            expected.dedup();
            assert_eq!(decode_ranges(&encode_ranges(input)), expected);
        }
    }
}
