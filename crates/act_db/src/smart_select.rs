use std::path::Path;
use std::sync::Arc;

use act_types::FunctionInfo;

/// Four-level smart-selection rule (§4.2.3): each level narrows the
/// candidate set; the first level that narrows it to exactly one wins.
pub fn select(
    candidates: &[Arc<FunctionInfo>],
    name: &str,
    context_file: Option<&Path>,
) -> Option<Arc<FunctionInfo>> {
    if candidates.is_empty() {
        return None;
    }
    if candidates.len() == 1 {
        return Some(candidates[0].clone());
    }

    // Level 1: prefer real definitions (non-empty calls) over declarations.
    let level1 = narrow(candidates, |f| f.has_body());
    if level1.len() == 1 {
        return Some(level1[0].clone());
    }

    // Level 2: prefer files whose stem shares the name's first `_`-token.
    let first_token = name.split('_').next().unwrap_or(name).to_lowercase();
    let level2 = narrow(&level1, |f| {
        f.file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|stem| stem.to_lowercase().starts_with(&first_token))
            .unwrap_or(false)
    });
    if level2.len() == 1 {
        return Some(level2[0].clone());
    }

    // Level 3: exclude records from context_file, unless that would empty
    // the set.
    let level3 = match context_file {
        Some(ctx) => {
            let excluded = narrow(&level2, |f| f.file_path != ctx);
            if excluded.is_empty() {
                level2.clone()
            } else {
                excluded
            }
        }
        None => level2.clone(),
    };
    if level3.len() == 1 {
        return Some(level3[0].clone());
    }

    // Level 4: prefer records with an assigned sw_module.
    let level4 = narrow(&level3, |f| f.sw_module.is_some());
    if level4.len() == 1 {
        return Some(level4[0].clone());
    }

    // Still ambiguous: first in insertion order.
    level4.first().or_else(|| level3.first()).cloned()
}

/// Narrows `candidates` to those matching `pred`, falling back to the full
/// set if nothing matches (so a level that eliminates everyone is a no-op,
/// per "otherwise pass the remaining set to the next level").
fn narrow(candidates: &[Arc<FunctionInfo>], pred: impl Fn(&FunctionInfo) -> bool) -> Vec<Arc<FunctionInfo>> {
    let filtered: Vec<Arc<FunctionInfo>> = candidates.iter().filter(|f| pred(f)).cloned().collect();
    if filtered.is_empty() {
        candidates.to_vec()
    } else {
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use act_types::FunctionType;
    use std::path::PathBuf;

    fn make(name: &str, file: &str, line: u32, has_calls: bool) -> Arc<FunctionInfo> {
        let mut f = FunctionInfo::new(name, PathBuf::from(file), line, FunctionType::TraditionalC, "void");
        if has_calls {
            f.calls.push(act_types::FunctionCall::new("Something"));
        }
        Arc::new(f)
    }

    #[test]
    fn single_candidate_returned_directly() {
        let c = vec![make("Foo", "a.c", 1, false)];
        assert!(select(&c, "Foo", None).is_some());
    }

    #[test]
    fn level1_prefers_definition_over_declaration() {
        let decl = make("COM_InitCommunication", "demo.c", 5, false);
        let def = make("COM_InitCommunication", "communication.c", 10, true);
        let candidates = vec![decl, def.clone()];
        let chosen = select(&candidates, "COM_InitCommunication", Some(Path::new("demo.c"))).unwrap();
        assert_eq!(chosen.file_path, def.file_path);
    }

    #[test]
    fn level2_prefers_matching_file_stem() {
        let a = make("COM_InitCommunication", "misc.c", 1, true);
        let b = make("COM_InitCommunication", "communication.c", 1, true);
        let candidates = vec![a, b.clone()];
        let chosen = select(&candidates, "COM_InitCommunication", None).unwrap();
        assert_eq!(chosen.file_path, b.file_path);
    }

    #[test]
    fn level3_excludes_context_file() {
        let local = make("Helper", "demo.c", 1, true);
        let other = make("Helper", "helper.c", 1, true);
        let candidates = vec![local, other.clone()];
        let chosen = select(&candidates, "Helper", Some(Path::new("demo.c"))).unwrap();
        assert_eq!(chosen.file_path, other.file_path);
    }

    #[test]
    fn level3_does_not_empty_set_when_all_are_local() {
        let only = make("Helper", "demo.c", 1, true);
        let candidates = vec![only.clone()];
        let chosen = select(&candidates, "Helper", Some(Path::new("demo.c"))).unwrap();
        assert_eq!(chosen.file_path, only.file_path);
    }

    #[test]
    fn level4_prefers_assigned_module() {
        let mut with_module = make("Foo", "a.c", 1, true);
        Arc::get_mut(&mut with_module).unwrap().sw_module = Some("ModA".to_string());
        let without_module = make("Foo", "b.c", 1, true);
        let candidates = vec![without_module, with_module.clone()];
        let chosen = select(&candidates, "Foo", None).unwrap();
        assert_eq!(chosen.sw_module.as_deref(), Some("ModA"));
    }

    #[test]
    fn unresolved_ties_fall_back_to_insertion_order() {
        let a = make("Foo", "a.c", 1, true);
        let b = make("Foo", "b.c", 1, true);
        let candidates = vec![a.clone(), b];
        let chosen = select(&candidates, "Foo", None).unwrap();
        assert_eq!(chosen.file_path, a.file_path);
    }
}
