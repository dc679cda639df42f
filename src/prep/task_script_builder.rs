/// Utility for building the contents of a `%command` block's script file.
/// Note that it modifies a String reference held internally;
/// read that String to get the script's contents.
#[derive(Debug)]
pub struct TaskScriptBuilder<'a> {
    strbuf: &'a mut String,
}

impl<'a> TaskScriptBuilder<'a> {
    pub fn new(strbuf: &'a mut String) -> Self {
        Self { strbuf }
    }
}

impl TaskScriptBuilder<'_> {
    /// shebang line (none for Windows batch files)
    pub fn write_prefix(&mut self) {
        self.strbuf.clear();
        if cfg!(not(windows)) {
            self.strbuf.push_str("#!/bin/bash\n");
        }
    }

    /// one line per command, in order.
    pub fn write_commands(&mut self, commands: &[String]) {
        for cmd in commands {
            self.strbuf.push_str(cmd);
            self.strbuf.push('\n');
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_script_text() {
        let mut strbuf = String::from("stale");
        let mut script = TaskScriptBuilder::new(&mut strbuf);
        script.write_prefix();
        script.write_commands(&["echo hi".to_owned(), "cp a b".to_owned()]);

        assert!(strbuf.ends_with("echo hi\ncp a b\n"));
        assert!(!strbuf.contains("stale"));
    }
}
