/// Built-in aliases for endoflife.date product slugs.
///
/// Only consulted for products that actually exist in the fetched catalog, so an
/// entry for a slug the service does not publish is inert.
pub fn builtin_aliases(product: &str) -> &'static [&'static str] {
    match product {
        // Runtimes
        "nodejs" => &["node", "node.js", "nodejs-lts"],
        "python" => &["cpython", "python3"],
        "go" => &["golang"],
        "dotnet" => &[".net", "dotnet-core", "aspnetcore", "microsoft.aspnetcore"],
        "ruby" => &["mri"],
        "php" => &["php-fpm", "php-cli"],
        "perl" => &["perl5"],
        "eclipse-temurin" => &["temurin", "adoptopenjdk"],
        "amazon-corretto" => &["corretto"],

        // Databases and middleware
        "postgresql" => &["postgres", "pgsql", "libpq"],
        "mongodb" => &["mongo", "mongod"],
        "mssqlserver" => &["mssql", "sql-server", "sqlserver"],
        "elasticsearch" => &["elastic-search"],
        "rabbitmq" => &["rabbit-mq"],
        "apache-http-server" => &["httpd", "apache2", "apache"],
        "apache-kafka" => &["kafka"],
        "tomcat" => &["apache-tomcat"],

        // Frameworks
        "ruby-on-rails" => &["rails", "rubyonrails"],
        "spring-boot" => &["springboot"],
        "spring-framework" => &["spring", "spring-core"],
        "log4j" => &["log4j-core", "log4j2"],

        // Platforms
        "kubernetes" => &["k8s", "kube"],
        "rhel" => &["redhat", "red-hat-enterprise-linux"],
        "windows-server" => &["winserver"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_aliases() {
        assert!(builtin_aliases("nodejs").contains(&"node"));
        assert!(builtin_aliases("postgresql").contains(&"postgres"));
        assert!(builtin_aliases("unknown-product").is_empty());
    }
}
