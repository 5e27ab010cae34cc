/// Uppercase a key and apply dunder compression.
///
/// With `dunder == 0` this is plain uppercasing. Otherwise every maximal run of underscores loses
/// up to `dunder` of its characters: with `dunder == 1`, `A__B` becomes `A_B` and `A_B` becomes
/// `AB`; with `dunder == 3`, `A____B` becomes `A_B`.
///
/// The same transform is applied to filter patterns so they keep matching compressed keys. It is
/// not idempotent for a non-zero `dunder`: running it again erodes the surviving runs further.
#[must_use]
pub fn normalize_key(key: &str, dunder: usize) -> String {
    let upper = key.to_uppercase();
    if dunder == 0 {
        return upper;
    }

    let mut result = String::with_capacity(upper.len());
    let mut run = 0_usize;
    for c in upper.chars() {
        if c == '_' {
            run += 1;
            continue;
        }

        push_run(&mut result, run, dunder);
        run = 0;
        result.push(c);
    }

    push_run(&mut result, run, dunder);
    result
}

fn push_run(result: &mut String, run: usize, dunder: usize) {
    for _ in 0..run.saturating_sub(dunder) {
        result.push('_');
    }
}
