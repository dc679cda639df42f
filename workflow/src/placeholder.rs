use std::io;

use syntax::ast::Params;
use syntax::{scan_reference, Reference, Script};

/// Reference that stands for the wavefunction file's base name.
pub const INPUT_VAR: &str = "input";

/// Read access to files referenced as `${file}`, rooted at the working directory.
pub trait FileSource {
    fn exists(&self, name: &str) -> bool;
    fn read_to_string(&self, name: &str) -> io::Result<String>;
}

/// Substitute `$name` and `${name}` references in `text`.
///
/// Lookup order: custom variables, then `input` (the wavefunction base name),
/// then for braced references only, the trimmed contents of a file with that name.
/// Anything else is copied through unchanged, and substituted text isn't rescanned.
pub fn resolve<F: FileSource>(text: &str, wfn_base: &str, vars: &Params, files: &F) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match scan_reference(rest) {
            Some((reference, len)) => {
                match lookup(reference, wfn_base, vars, files) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[..len]),
                }
                rest = &rest[len..];
            }
            None => {
                out.push('$');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn lookup<F: FileSource>(
    reference: Reference,
    wfn_base: &str,
    vars: &Params,
    files: &F,
) -> Option<String> {
    let name = reference.name();
    if name.is_empty() {
        return None;
    }
    if let Some(value) = vars.get(name) {
        return Some(value.clone());
    }
    if name == INPUT_VAR {
        return Some(wfn_base.to_owned());
    }
    if let Reference::Braced(file) = reference {
        if files.exists(file) {
            return match files.read_to_string(file) {
                Ok(contents) => Some(contents.trim().to_owned()),
                Err(e) => {
                    log::warn!("Cannot read file '{file}' for placeholder: {e}");
                    None
                }
            };
        }
    }
    None
}

/// Resolve references in every task's params, post-process params and commands.
///
/// Module tasks also get an `input` param (the custom variable if one is
/// declared, else `wfn_base`) unless they set it themselves, so template
/// commands can refer to `$input`.
pub fn resolve_script<F: FileSource>(script: &mut Script, wfn_base: &str, files: &F) {
    let vars = &script.directives.vars;
    let input = vars.get(INPUT_VAR).map_or(wfn_base, String::as_str);
    for task in &mut script.tasks {
        resolve_params(&mut task.params, wfn_base, vars, files);
        for step in &mut task.post_process {
            resolve_params(&mut step.params, wfn_base, vars, files);
        }
        if !task.is_bare() {
            task.params
                .entry(INPUT_VAR.to_owned())
                .or_insert_with(|| input.to_owned());
            for step in &mut task.post_process {
                step.params
                    .entry(INPUT_VAR.to_owned())
                    .or_insert_with(|| input.to_owned());
            }
        }
        for cmd in &mut task.commands {
            *cmd = resolve(cmd, wfn_base, vars, files);
        }
    }
}

fn resolve_params<F: FileSource>(params: &mut Params, wfn_base: &str, vars: &Params, files: &F) {
    for value in params.values_mut() {
        *value = resolve(value, wfn_base, vars, files);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use syntax::{parse_script, ParseOptions};
    use util::HashMap;

    #[derive(Default)]
    struct MemFiles(HashMap<String, Option<String>>);

    impl MemFiles {
        fn with(mut self, name: &str, contents: Option<&str>) -> Self {
            self.0.insert(name.to_owned(), contents.map(str::to_owned));
            self
        }
    }

    impl FileSource for MemFiles {
        fn exists(&self, name: &str) -> bool {
            self.0.contains_key(name)
        }

        fn read_to_string(&self, name: &str) -> io::Result<String> {
            match self.0.get(name) {
                Some(Some(contents)) => Ok(contents.clone()),
                Some(None) => Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
                None => Err(io::ErrorKind::NotFound.into()),
            }
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_custom_var_beats_input() {
        let files = MemFiles::default();
        assert_eq!("X", resolve("$input", "mol", &vars(&[("input", "X")]), &files));
        assert_eq!("mol.cub", resolve("$input.cub", "mol", &Params::default(), &files));
        assert_eq!("mol", resolve("${input}", "mol", &Params::default(), &files));
    }

    #[test]
    fn test_unresolved_left_alone() {
        let files = MemFiles::default();
        let none = Params::default();
        assert_eq!("$unknown_xyz", resolve("$unknown_xyz", "mol", &none, &files));
        assert_eq!("${missing.txt}", resolve("${missing.txt}", "mol", &none, &files));
        assert_eq!("cost $ 5", resolve("cost $ 5", "mol", &none, &files));
        assert_eq!("${abc", resolve("${abc", "mol", &none, &files));
        assert_eq!("trailing $", resolve("trailing $", "mol", &none, &files));
    }

    #[test]
    fn test_braced_file_contents() {
        let files = MemFiles::default()
            .with("atoms.txt", Some("  1,2,3\n"))
            .with("locked.txt", None);
        let none = Params::default();
        assert_eq!("atoms 1,2,3 done", resolve("atoms ${atoms.txt} done", "m", &none, &files));
        // bare form never reads files:
        assert_eq!("$atoms.txt", resolve("$atoms.txt", "m", &none, &files));
        // read failure leaves the reference as is:
        assert_eq!("${locked.txt}", resolve("${locked.txt}", "m", &none, &files));
        // variables still win over files:
        let v = vars(&[("atoms.txt", "var")]);
        assert_eq!("var", resolve("${atoms.txt}", "m", &v, &files));
    }

    #[test]
    fn test_no_rescan() {
        let v = vars(&[("a", "$b"), ("b", "nope")]);
        assert_eq!("$b", resolve("$a", "m", &v, &MemFiles::default()));
    }

    #[test]
    fn test_resolve_script() {
        let mut script = parse_script(
            "out=result\n[cube]\ngrid $out\n%process\nexport name ${input}_$out\n%command\ncp $input.cub ${out}.cub\nend\n",
            &ParseOptions::default(),
        );
        resolve_script(&mut script, "water", &MemFiles::default());

        let task = &script.tasks[0];
        assert_eq!(Some("result"), task.params.get("grid").map(String::as_str));
        assert_eq!(
            Some("water_result"),
            task.post_process[0].params.get("name").map(String::as_str)
        );
        assert_eq!(vec!["cp water.cub result.cub"], task.commands);
        assert_eq!(Some("water"), task.params.get(INPUT_VAR).map(String::as_str));
        assert_eq!(
            Some("water"),
            task.post_process[0].params.get(INPUT_VAR).map(String::as_str)
        );
    }

    #[test]
    fn test_input_param_respects_overrides() {
        let mut script = parse_script(
            "input=custom\n[sp]\nend\n[sp]\ninput other\nend\n%command\necho $input\nend\n",
            &ParseOptions::default(),
        );
        resolve_script(&mut script, "water", &MemFiles::default());

        assert_eq!(3, script.tasks.len());
        assert_eq!(Some("custom"), script.tasks[0].params.get(INPUT_VAR).map(String::as_str));
        assert_eq!(Some("other"), script.tasks[1].params.get(INPUT_VAR).map(String::as_str));
        assert!(script.tasks[2].params.is_empty());
        assert_eq!(vec!["echo custom"], script.tasks[2].commands);
    }
}
