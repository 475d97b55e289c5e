/*!
The built-in file type registry.

A file type associates a short tag (e.g., `c`, `python`) with a comma
separated list of file name extensions and, for the capitalized variants,
a magic signature regex matched against a file's leading bytes. The
registry is closed: callers can look types up and enumerate them, but
not extend them.
*/

/// A single file type definition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileTypeDef {
    name: &'static str,
    extensions: &'static str,
    magic: Option<&'static str>,
}

impl FileTypeDef {
    /// Return the name of this file type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Return the comma separated extensions recognized for this file
    /// type.
    pub fn extensions(&self) -> &'static str {
        self.extensions
    }

    /// Return the magic signature regex for this file type, if it has
    /// one. Capitalized type names carry a signature; their lower case
    /// twins select by extension only.
    pub fn magic(&self) -> Option<&'static str> {
        self.magic
    }
}

/// Return all built-in file type definitions, in order.
pub fn definitions() -> &'static [FileTypeDef] {
    DEFAULT_TYPES
}

/// Look a file type up by its tag. Tags are case sensitive, since the
/// capitalized variants add magic signatures.
pub fn find_type(name: &str) -> Option<&'static FileTypeDef> {
    DEFAULT_TYPES.iter().find(|def| def.name == name)
}

macro_rules! def {
    ($name:expr, $exts:expr) => {
        FileTypeDef { name: $name, extensions: $exts, magic: None }
    };
    ($name:expr, $exts:expr, $magic:expr) => {
        FileTypeDef { name: $name, extensions: $exts, magic: Some($magic) }
    };
}

#[rustfmt::skip]
const DEFAULT_TYPES: &[FileTypeDef] = &[
    def!("actionscript", "as,mxml"),
    def!("ada",          "ada,adb,ads"),
    def!("asm",          "asm,s,S"),
    def!("asp",          "asp"),
    def!("aspx",         "master,ascx,asmx,aspx,svc"),
    def!("autoconf",     "ac,in"),
    def!("automake",     "am,in"),
    def!("awk",          "awk"),
    def!("Awk",          "awk", r"#!/.*\Wg?awk(\W.*)?\n"),
    def!("basic",        "bas,BAS,cls,frm,ctl,vb,resx"),
    def!("batch",        "bat,BAT,cmd,CMD"),
    def!("bison",        "y,yy,yxx"),
    def!("c",            "c,h,H,hdl,xs"),
    def!("c++",          "cpp,CPP,cc,cxx,CXX,h,hh,H,hpp,hxx,Hxx,HXX"),
    def!("clojure",      "clj"),
    def!("csharp",       "cs"),
    def!("css",          "css"),
    def!("csv",          "csv"),
    def!("dart",         "dart"),
    def!("Dart",         "dart", r"#!/.*\Wdart(\W.*)?\n"),
    def!("delphi",       "pas,int,dfm,nfm,dof,dpk,dproj,groupproj,bdsgroup,bdsproj"),
    def!("elisp",        "el"),
    def!("elixir",       "ex,exs"),
    def!("erlang",       "erl,hrl"),
    def!("fortran",      "for,ftn,fpp,f,F,f77,F77,f90,F90,f95,F95,f03,F03"),
    def!("gif",          "gif"),
    def!("Gif",          "gif", "GIF87a|GIF89a"),
    def!("go",           "go"),
    def!("groovy",       "groovy,gtmpl,gpp,grunit,gradle"),
    def!("gsp",          "gsp"),
    def!("haskell",      "hs,lhs"),
    def!("html",         "htm,html,xhtml"),
    def!("jade",         "jade"),
    def!("java",         "java,properties"),
    def!("jpeg",         "jpg,jpeg"),
    def!("Jpeg",         "jpg,jpeg", r"\xff\xd8\xff[\xdb\xe0\xe1\xee]"),
    def!("js",           "js"),
    def!("json",         "json"),
    def!("jsp",          "jsp,jspx,jthm,jhtml"),
    def!("julia",        "jl"),
    def!("kotlin",       "kt,kts"),
    def!("less",         "less"),
    def!("lex",          "l,ll,lxx"),
    def!("lisp",         "lisp,lsp"),
    def!("lua",          "lua"),
    def!("m4",           "m4"),
    def!("make",         "mk,mak,makefile,Makefile,Makefile.Debug,Makefile.Release"),
    def!("markdown",     "md"),
    def!("matlab",       "m"),
    def!("node",         "js"),
    def!("Node",         "js", r"#!/.*\Wnode(\W.*)?\n"),
    def!("objc",         "m,h"),
    def!("objc++",       "mm,h"),
    def!("ocaml",        "ml,mli,mll,mly"),
    def!("parrot",       "pir,pasm,pmc,ops,pod,pg,tg"),
    def!("pascal",       "pas,pp"),
    def!("pdf",          "pdf"),
    def!("Pdf",          "pdf", r"\x25\x50\x44\x46\x2d"),
    def!("perl",         "pl,PL,pm,pod,t,psgi"),
    def!("Perl",         "pl,PL,pm,pod,t,psgi", r"#!/.*\Wperl(\W.*)?\n"),
    def!("php",          "php,php3,php4,phtml"),
    def!("Php",          "php,php3,php4,phtml", r"#!/.*\Wphp(\W.*)?\n"),
    def!("png",          "png"),
    def!("Png",          "png", r"\x89PNG\x0d\x0a\x1a\x0a"),
    def!("prolog",       "pl,pro"),
    def!("python",       "py"),
    def!("Python",       "py", r"#!/.*\Wpython(\W.*)?\n"),
    def!("r",            "R"),
    def!("rpm",          "rpm"),
    def!("Rpm",          "rpm", r"\xed\xab\xee\xdb"),
    def!("rst",          "rst"),
    def!("rtf",          "rtf"),
    def!("Rtf",          "rtf", r"\{\\rtf1"),
    def!("ruby",         "rb,rhtml,rjs,rxml,erb,rake,spec,Rakefile"),
    def!("Ruby",         "rb,rhtml,rjs,rxml,erb,rake,spec,Rakefile", r"#!/.*\Wruby(\W.*)?\n"),
    def!("rust",         "rs"),
    def!("scala",        "scala"),
    def!("scheme",       "scm,ss"),
    def!("shell",        "sh,bash,dash,csh,tcsh,ksh,zsh,fish"),
    def!("Shell",        "sh,bash,dash,csh,tcsh,ksh,zsh,fish", r"#!/.*\W(ba|da|t?c|k|z|fi)?sh(\W.*)?\n"),
    def!("smalltalk",    "st"),
    def!("sql",          "sql,ctl"),
    def!("svg",          "svg"),
    def!("swift",        "swift"),
    def!("tcl",          "tcl,itcl,itk"),
    def!("tex",          "tex,cls,sty,bib"),
    def!("text",         "text,txt,TXT,md"),
    def!("tiff",         "tif,tiff"),
    def!("Tiff",         "tif,tiff", r"\x49\x49\x2a\x00|\x4d\x4d\x00\x2a"),
    def!("tt",           "tt,tt2,ttml"),
    def!("typescript",   "ts,tsx"),
    def!("verilog",      "v,vh,sv"),
    def!("vhdl",         "vhd,vhdl"),
    def!("vim",          "vim"),
    def!("xml",          "xml,xsd,xsl,xslt,wsdl,rss,svg,ent,plist"),
    def!("Xml",          "xml,xsd,xsl,xslt,wsdl,rss,svg,ent,plist", r"<\?xml "),
    def!("yacc",         "y"),
    def!("yaml",         "yaml,yml"),
];

#[cfg(test)]
mod tests {
    use super::{definitions, find_type};

    #[test]
    fn lookup() {
        let def = find_type("rust").unwrap();
        assert_eq!(def.extensions(), "rs");
        assert!(def.magic().is_none());
        assert!(find_type("nope").is_none());
    }

    #[test]
    fn capitalized_variants_have_magic() {
        let lower = find_type("python").unwrap();
        let upper = find_type("Python").unwrap();
        assert_eq!(lower.extensions(), upper.extensions());
        assert!(lower.magic().is_none());
        assert!(upper.magic().is_some());
    }

    #[test]
    fn table_is_nonempty_and_named() {
        assert!(definitions().len() > 50);
        assert!(definitions().iter().all(|d| !d.name().is_empty()));
    }
}
