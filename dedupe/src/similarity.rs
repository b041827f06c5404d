use std::collections::HashMap;

/// Ratcliff/Obershelp similarity of two strings, ignoring case.
///
/// Returns `2 * M / T` where `M` is the number of characters covered by the
/// matching blocks and `T` the total character count of both inputs. Two
/// empty strings are considered identical (`1.0`).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    // block selection depends on argument order, fix one so ratio(a, b) == ratio(b, a)
    let (first, second) = if a <= b { (a, b) } else { (b, a) };

    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();

    let total = first.len() + second.len();
    if total == 0 {
        return 1.0;
    }

    let matched = SequenceMatcher::new(&first, &second).matched_len();

    2.0 * matched as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    // every index at which a character occurs in `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a_start: usize,
    b_start: usize,
    len: usize,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();

        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }

        Self { a, b, b2j }
    }

    /// Longest block inside `a[alo..ahi]` x `b[blo..bhi]`. Ties go to the
    /// block starting first in `a`, then first in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut best = Block {
            a_start: alo,
            b_start: blo,
            len: 0,
        };

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len: HashMap<usize, usize> = HashMap::new();

            let Some(positions) = self.b2j.get(&self.a[i]) else {
                j2len = next_j2len;
                continue;
            };

            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }

                let run = match j.checked_sub(1) {
                    Some(previous) => j2len.get(&previous).copied().unwrap_or(0),
                    None => 0,
                } + 1;
                next_j2len.insert(j, run);

                if run > best.len {
                    best = Block {
                        a_start: i + 1 - run,
                        b_start: j + 1 - run,
                        len: run,
                    };
                }
            }

            j2len = next_j2len;
        }

        best
    }

    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);

            if block.len == 0 {
                continue;
            }

            matched += block.len;

            if alo < block.a_start && blo < block.b_start {
                pending.push((alo, block.a_start, blo, block.b_start));
            }

            let a_end = block.a_start + block.len;
            let b_end = block.b_start + block.len;

            if a_end < ahi && b_end < bhi {
                pending.push((a_end, ahi, b_end, bhi));
            }
        }

        matched
    }
}
