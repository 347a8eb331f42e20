use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use facet_url::{
    BaseUrlMaterializer, FacetMode, FacetSettings, FilterItem, FilterUrlCodec, LinkBuilder, RequestKind,
};

mod config;
mod logging;

use config::CliConfig;

fn url_arg() -> Arg {
    Arg::new("url")
        .short('u')
        .long("url")
        .value_name("URL")
        .help("当前请求的完整地址")
        .required(true)
}

fn key_arg() -> Arg {
    Arg::new("key")
        .short('k')
        .long("key")
        .value_name("URL_KEY")
        .help("分面在 URL 中的参数名")
        .required(true)
}

fn value_arg() -> Arg {
    Arg::new("value")
        .long("value")
        .value_name("VALUE")
        .help("筛选项的值")
        .required(true)
}

fn multi_arg() -> Arg {
    Arg::new("multi")
        .short('m')
        .long("multi")
        .help("分面为多选")
        .action(ArgAction::SetTrue)
}

fn clean_arg() -> Arg {
    Arg::new("clean")
        .long("clean")
        .value_name("VALUE")
        .help("分面未筛选时的值")
        .default_value("")
}

fn cli() -> Command {
    Command::new("分面筛选链接工具")
        .version(env!("CARGO_PKG_VERSION"))
        .about("解析筛选查询参数并生成筛选链接")
        .subcommand_required(true)
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("CONFIG_FILE")
            .help("JSON 配置文件（编解码器配置与分类表）")
            .global(true))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示调试日志")
            .action(ArgAction::SetTrue)
            .global(true))
        .subcommand(Command::new("decode")
            .about("解析请求地址中的筛选、分页与分类参数")
            .arg(url_arg())
            .arg(Arg::new("search")
                .short('s')
                .long("search")
                .help("按搜索请求处理（接受搜索词）")
                .action(ArgAction::SetTrue)))
        .subcommand(Command::new("select")
            .about("生成选中筛选项的链接")
            .arg(url_arg()).arg(key_arg()).arg(value_arg()).arg(multi_arg()))
        .subcommand(Command::new("remove")
            .about("生成取消筛选项的链接")
            .arg(url_arg()).arg(key_arg()).arg(value_arg()).arg(multi_arg()).arg(clean_arg()))
        .subcommand(Command::new("clear")
            .about("生成清除全部筛选的链接")
            .arg(url_arg())
            .arg(Arg::new("filter")
                .short('f')
                .long("filter")
                .value_name("KEY=CLEAN")
                .help("已选筛选的参数名及其未筛选值，可重复")
                .action(ArgAction::Append)
                .required(true)))
        .subcommand(Command::new("slider")
            .about("生成滑块筛选的链接模板")
            .arg(url_arg()).arg(key_arg()))
        .subcommand(Command::new("category")
            .about("生成选择分类的链接")
            .arg(url_arg())
            .arg(key_arg().required(false).default_value("categorie"))
            .arg(Arg::new("id")
                .long("id")
                .value_name("CATEGORY_ID")
                .help("要选择的分类 ID")
                .value_parser(value_parser!(u64))
                .required(true)))
        .subcommand(Command::new("filter")
            .about("生成只保留当前属性筛选的链接")
            .arg(url_arg()))
}

// 主函数
fn main() {
    let matches = cli().get_matches();
    logging::init_logging(matches.get_flag("verbose"));

    if let Err(e) = run(&matches) {
        tracing::error!("{:#}", e);
        eprintln!("错误: {:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = match matches.get_one::<String>("config") {
        Some(path) => CliConfig::load(Path::new(path))?,
        None => CliConfig::default(),
    };
    let codec = FilterUrlCodec::new(config.codec);

    let (name, sub) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => bail!("缺少子命令"),
    };

    let url = required(sub, "url")?;
    let materializer = BaseUrlMaterializer::from_request_url(url)
        .with_context(|| format!("无效的请求地址 {}", url))?;
    let builder = LinkBuilder::new(&codec, materializer);

    let output = match name {
        "decode" => {
            let kind = if sub.get_flag("search") { RequestKind::Search } else { RequestKind::Navigation };
            serde_json::to_string_pretty(&codec.decode(builder.current(), kind))?
        }
        "select" => builder.select_url(&filter_item(sub)?),
        "remove" => builder.remove_url(&filter_item(sub)?),
        "clear" => builder.clear_url(&active_filters(sub)?),
        "slider" => builder.slider_url(required(sub, "key")?),
        "category" => {
            let id = sub.get_one::<u64>("id").copied().context("缺少分类 ID")?;
            builder.category_select_url(required(sub, "key")?, id, &config.categories)?
        }
        "filter" => builder.filter_url(),
        other => bail!("未知子命令: {}", other),
    };

    println!("{}", output);
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("缺少参数 --{}", name))
}

fn filter_item(matches: &ArgMatches) -> Result<FilterItem> {
    let mode = if matches.get_flag("multi") { FacetMode::Multi } else { FacetMode::Single };
    let clean_value = matches.try_get_one::<String>("clean").ok().flatten().cloned().unwrap_or_default();
    Ok(FilterItem::new(
        FacetSettings::new(required(matches, "key")?, mode),
        required(matches, "value")?,
        clean_value,
    ))
}

// `key=clean` -> 已选筛选项
fn active_filters(matches: &ArgMatches) -> Result<Vec<FilterItem>> {
    matches
        .get_many::<String>("filter")
        .into_iter()
        .flatten()
        .map(|raw| parse_active_filter(raw))
        .collect()
}

fn parse_active_filter(raw: &str) -> Result<FilterItem> {
    let (key, clean_value) = raw.split_once('=').unwrap_or((raw, ""));
    if key.is_empty() {
        bail!("无效的筛选参数: '{}'", raw);
    }
    Ok(FilterItem::new(FacetSettings::new(key, FacetMode::Single), "", clean_value))
}
